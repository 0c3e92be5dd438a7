//! Stylesheet syntax errors.

use cssparser::{BasicParseErrorKind, ParseError as CssParseError, ParseErrorKind, ToCss, Token};

use crate::Error;

/// Custom error raised by the stylesheet grammar on top of `cssparser`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError(pub String);

impl SyntaxError {
    /// Create a syntax error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// An unexpected-token message.
    pub fn unexpected(token: &Token<'_>, context: &str) -> Self {
        Self(format!("unexpected '{}' {}", describe(token), context))
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse result carrying a `cssparser` error with a [`SyntaxError`] payload.
pub(crate) type ParseResult<'i, T> = std::result::Result<T, CssParseError<'i, SyntaxError>>;

/// Convert a positioned `cssparser` error into a crate error.
///
/// `cssparser` lines are 0-based, columns 1-based.
pub(crate) fn to_error(source_name: &str, error: CssParseError<'_, SyntaxError>) -> Error {
    let message = match error.kind {
        ParseErrorKind::Custom(SyntaxError(message)) => message,
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("unexpected '{}'", describe(&token))
        }
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => "unexpected end of input".into(),
        ParseErrorKind::Basic(other) => format!("{other:?}"),
    };
    Error::parse(source_name, error.location.line + 1, error.location.column, message)
}

fn describe(token: &Token<'_>) -> String {
    match token {
        Token::WhiteSpace(_) => "whitespace".into(),
        Token::CurlyBracketBlock => "{".into(),
        Token::ParenthesisBlock => "(".into(),
        Token::SquareBracketBlock => "[".into(),
        other => other.to_css_string(),
    }
}
