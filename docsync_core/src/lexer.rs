use logos::Logos;

use crate::tokens::SpannedToken;
use crate::tokens::Token;

/// Raw tokens produced by logos for flat tokenization of markdown text.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[token("<!--")]
	HtmlCommentOpen,
	#[token("-->")]
	HtmlCommentClose,
	#[token("@include")]
	IncludeKeyword,
	#[token("@site")]
	SiteKeyword,
	#[token("@endsite")]
	EndSiteKeyword,
	#[regex(r"\s+")]
	Whitespace,
	#[token(">")]
	AngleClose,
	#[regex(r"[^\s<>@\-]+")]
	Text,
}

impl From<RawToken> for Token {
	fn from(raw: RawToken) -> Self {
		match raw {
			RawToken::HtmlCommentOpen => Token::HtmlCommentOpen,
			RawToken::HtmlCommentClose => Token::HtmlCommentClose,
			RawToken::IncludeKeyword => Token::IncludeKeyword,
			RawToken::SiteKeyword => Token::SiteKeyword,
			RawToken::EndSiteKeyword => Token::EndSiteKeyword,
			RawToken::Whitespace => Token::Whitespace,
			RawToken::AngleClose => Token::AngleClose,
			RawToken::Text => Token::Text,
		}
	}
}

/// Tokenize markdown text into a flat, gap-free token stream.
///
/// Bytes that logos does not recognise (a lone `<`, `@` or `-`) become
/// [`Token::Text`] so the spans always cover the whole input. Adjacent text
/// tokens are merged.
pub fn tokenize(content: &str) -> Vec<SpannedToken> {
	let mut tokens: Vec<SpannedToken> = Vec::new();

	for (result, span) in RawToken::lexer(content).spanned() {
		let token = result.map_or(Token::Text, Token::from);

		if token == Token::Text {
			if let Some(last) = tokens.last_mut() {
				if last.token == Token::Text && last.span.end == span.start {
					last.span.end = span.end;
					continue;
				}
			}
		}

		tokens.push(SpannedToken::new(token, span));
	}

	tokens
}
