//! Parse error types.

use crate::token::Span;

/// An error that occurred during parsing, including lexical errors
/// surfaced through the token channel.
///
/// `ParseError` contains a human-readable message naming the offending
/// token, and the source location where the error occurred. Positions are
/// rendered by the diagnostics layer, which has access to the source text.
#[derive(Debug)]
pub struct ParseError {
    /// A human-readable description of the error.
    pub message: String,
    /// The source location where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }

    /// Creates an error for a state the parser can only reach through a bug
    /// of its own (e.g. a dangling block id).
    pub fn internal(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: format!("{}. This is a compiler bug.", message.into()),
            span,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}
