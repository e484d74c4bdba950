use std::ops::Range;

use crate::lexer::tokenize;
use crate::tokens::SpannedToken;
use crate::tokens::Token;

/// A single rule inside `<!-- @site ... -->`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteRule {
	/// `site-a`: keep the body for this site.
	Include(String),
	/// `!site-a`: drop the body for this site.
	Exclude(String),
}

impl SiteRule {
	/// Parse one comma separated entry. Surrounding whitespace is ignored,
	/// whitespace after `!` is kept as part of the site name.
	pub fn parse(raw: &str) -> Self {
		let raw = raw.trim();
		match raw.strip_prefix('!') {
			Some(site) => Self::Exclude(site.to_string()),
			None => Self::Include(raw.to_string()),
		}
	}

	/// Parse a full `site-a, !site-b` rule list.
	pub fn parse_list(raw: &str) -> Vec<Self> {
		raw.split(',').map(Self::parse).collect()
	}

	pub fn is_exclusion(&self) -> bool {
		matches!(self, Self::Exclude(_))
	}

	pub fn site(&self) -> &str {
		match self {
			Self::Include(site) | Self::Exclude(site) => site,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveKind {
	/// `<!-- @include <source>:<path> -->`. The reference is trimmed.
	Include { reference: String },
	/// `<!-- @site <rule>[, <rule>]* -->`
	Site { rules: Vec<SiteRule> },
	/// `<!-- @endsite -->`
	EndSite,
}

/// A well formed directive comment and the byte range it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
	pub kind: DirectiveKind,
	/// Covers the whole comment, from `<!--` through `-->`.
	pub span: Range<usize>,
}

impl Directive {
	/// 1-indexed line of the opening `<!--` in `content`.
	pub fn line(&self, content: &str) -> usize {
		content[..self.span.start].matches('\n').count() + 1
	}
}

/// Scan text for directives. Malformed comments are skipped and left for the
/// caller to treat as ordinary text.
pub fn scan_directives(content: &str) -> Vec<Directive> {
	let mut walker = DirectiveWalker::new(content);
	walker.process();
	walker.directives
}

/// Walks the token stream looking for `<!--` and trying to read a directive
/// from each one.
struct DirectiveWalker<'a> {
	/// The text being scanned.
	source: &'a str,
	/// Tokens covering the whole of `source`.
	tokens: Vec<SpannedToken>,
	/// Current index into `tokens`.
	cursor: usize,
	/// Collected directives, in source order and never overlapping.
	directives: Vec<Directive>,
}

impl<'a> DirectiveWalker<'a> {
	fn new(source: &'a str) -> Self {
		Self {
			source,
			tokens: tokenize(source),
			cursor: 0,
			directives: vec![],
		}
	}

	fn process(&mut self) {
		while self.cursor < self.tokens.len() {
			if self.tokens[self.cursor].token != Token::HtmlCommentOpen {
				self.cursor += 1;
				continue;
			}

			match self.read_directive(self.cursor) {
				Some((directive, next)) => {
					self.directives.push(directive);
					self.cursor = next;
				}
				// Resume right after the failed `<!--`.
				None => self.cursor += 1,
			}
		}
	}

	/// Skip a single whitespace token (whitespace runs are already merged by
	/// the lexer).
	fn skip_whitespace(&self, index: usize) -> usize {
		match self.tokens.get(index) {
			Some(token) if token.token.is_whitespace() => index + 1,
			_ => index,
		}
	}

	/// Try to read a directive whose `<!--` is at `open`. Returns the
	/// directive and the index of the first token after it.
	fn read_directive(&self, open: usize) -> Option<(Directive, usize)> {
		let keyword_index = self.skip_whitespace(open + 1);
		let keyword = self.tokens.get(keyword_index)?;
		let start = self.tokens[open].span.start;

		if keyword.token == Token::EndSiteKeyword {
			let close_index = self.skip_whitespace(keyword_index + 1);
			let close = self.tokens.get(close_index)?;
			if close.token != Token::HtmlCommentClose {
				return None;
			}

			let directive = Directive {
				kind: DirectiveKind::EndSite,
				span: start..close.span.end,
			};
			return Some((directive, close_index + 1));
		}

		if !keyword.token.takes_argument() {
			return None;
		}

		// The keyword must be followed by at least one whitespace character.
		if !self.tokens.get(keyword_index + 1)?.token.is_whitespace() {
			return None;
		}

		// The argument runs up to the first `-->` and must not contain `>`.
		let mut close_index = keyword_index + 1;
		loop {
			match self.tokens.get(close_index)?.token {
				Token::HtmlCommentClose => break,
				Token::AngleClose => return None,
				_ => close_index += 1,
			}
		}

		let close = &self.tokens[close_index];
		let between = &self.source[keyword.span.end..close.span.start];

		// One whitespace character plus at least one argument character.
		if between.chars().nth(1).is_none() {
			return None;
		}

		let argument = between.trim();
		let kind = match keyword.token {
			Token::IncludeKeyword => {
				DirectiveKind::Include {
					reference: argument.to_string(),
				}
			}
			_ => {
				DirectiveKind::Site {
					rules: SiteRule::parse_list(argument),
				}
			}
		};

		let directive = Directive {
			kind,
			span: start..close.span.end,
		};

		Some((directive, close_index + 1))
	}
}
