use std::fmt::Display;
use std::ops::Range;

/// Only the pieces of text that can take part in a directive are
/// distinguished. Everything else collapses into [`Token::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
	/// `<!--`
	HtmlCommentOpen,
	/// `-->`
	HtmlCommentClose,
	/// `@include`
	IncludeKeyword,
	/// `@site`
	SiteKeyword,
	/// `@endsite`
	EndSiteKeyword,
	/// A run of Unicode whitespace, including NBSP and line separators.
	Whitespace,
	/// A `>` that is not part of `-->`. Directive arguments may not contain
	/// one.
	AngleClose,
	/// Any other run of text.
	Text,
}

impl Token {
	pub fn is_whitespace(self) -> bool {
		matches!(self, Token::Whitespace)
	}

	/// Keywords that open a directive with an argument.
	pub fn takes_argument(self) -> bool {
		matches!(self, Token::IncludeKeyword | Token::SiteKeyword)
	}
}

impl Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Token::HtmlCommentOpen => write!(f, "<!--"),
			Token::HtmlCommentClose => write!(f, "-->"),
			Token::IncludeKeyword => write!(f, "@include"),
			Token::SiteKeyword => write!(f, "@site"),
			Token::EndSiteKeyword => write!(f, "@endsite"),
			Token::Whitespace => write!(f, "<whitespace>"),
			Token::AngleClose => write!(f, ">"),
			Token::Text => write!(f, "<text>"),
		}
	}
}

/// A token together with the byte range it covers in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
	pub token: Token,
	pub span: Range<usize>,
}

impl SpannedToken {
	pub fn new(token: Token, span: Range<usize>) -> Self {
		Self { token, span }
	}

	/// The text this token covers.
	pub fn slice<'a>(&self, source: &'a str) -> &'a str {
		&source[self.span.clone()]
	}
}
