//! Parser for the PL/SQL subset.
//!
//! This module provides the [`Parser`], the consumer half of the lex/parse
//! pipeline. It drains the token channel produced by [`crate::lexer::Lexer`]
//! and materializes an [`crate::ast::Package`] map keyed by package name.
//!
//! # Overview
//!
//! Like the lexer, the parser is driven by a state-function scheme: the
//! top-level grammar states live in [`state`] and are dispatched through a
//! match in [`Parser::parse`], while block bodies are parsed by direct
//! recursion (IF and WHILE nest).
//!
//! # Grammar
//!
//! ```text
//! program     → package+ EOF
//! package     → "CREATE" "OR" "REPLACE" "PACKAGE" "BODY" IDENT "AS"
//!               procedure* "END" IDENT ";" "/"
//! procedure   → "PROCEDURE" IDENT [ "(" param ("," param)* ")" ] "IS"
//!               local* "BEGIN" body
//! param       → IDENT ownership IDENT        (ownership: IN | OUT | INOUT)
//! local       → IDENT IDENT ":=" value ";"
//! body        → stmt* "END" [ "IF" | "LOOP" ] ";"
//! stmt        → call ";" | IDENT ":=" expr ";"
//!             | "IF" binop "THEN" body [ "ELSE" body ]
//!             | "WHILE" binop "LOOP" body
//! call        → IDENT "." IDENT "(" args ")" | IDENT "(" args ")"
//! expr        → STRING | NUMBER | IDENT | binop
//! binop       → expr OP expr                 (OP: one of the operator tokens)
//! ```
//!
//! # Failure semantics
//!
//! Any unexpected token is fatal and aborts the whole compile; there is no
//! error recovery. A lexical [`TokenKind::Error`] token arriving on the
//! channel is converted into a [`ParseError`] at the single choke point
//! ([`Parser::next`]/[`Parser::peek`]), so replacing the fatal policy means
//! changing exactly one place.
//!
//! # Module Structure
//!
//! - [`error`] - parse error types
//! - [`state`] - the top-level state functions
//! - `stmt` - block-body statement parsing
//! - `expr` - expression parsing
//! - `tests` - unit tests (test-only)
//!
//! # See Also
//!
//! * [`crate::lexer`] - Produces the token stream consumed here
//! * [`crate::ast`] - The tree this parser builds
//! * [`crate::codegen`] - Consumes the tree

mod error;
mod expr;
mod state;
mod stmt;

#[cfg(test)]
mod tests;

pub use error::ParseError;

use crossbeam::channel::Receiver;
use indexmap::IndexMap;

use crate::ast::Package;
use crate::token::{Span, Token, TokenKind};

use state::ParserState;

/// A state-function parser over the lexer's token channel.
///
/// The parser holds its one-token lookahead in a local slot (`peeked`); the
/// channel itself is the only shared state with the lexer, so tokens arrive
/// in strict source order and nothing races.
pub struct Parser {
    /// Consumer side of the token channel.
    input: Receiver<Token>,
    /// One-token lookahead slot.
    peeked: Option<Token>,
    /// Parsed packages, keyed by name, in source order.
    packages: IndexMap<String, Package>,
    /// Span of the most recently delivered token, for end-of-input errors.
    last_span: Span,
}

impl Parser {
    /// Creates a parser draining the given token channel.
    pub fn new(input: Receiver<Token>) -> Self {
        Parser {
            input,
            peeked: None,
            packages: IndexMap::new(),
            last_span: Span::new(0, 0),
        }
    }

    /// Runs the state machine to completion and returns the package map.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] encountered; parsing does not
    /// recover. Lexical errors delivered on the channel surface here too.
    pub fn parse(mut self) -> Result<IndexMap<String, Package>, ParseError> {
        let mut parse_state = ParserState::Text;
        loop {
            parse_state = match parse_state {
                ParserState::Text => self.parse_text()?,
                ParserState::CreatePackage => self.parse_create_package()?,
                ParserState::InsidePackage { package } => {
                    self.parse_inside_package(package)?
                }
                ParserState::Function { package, function } => {
                    self.parse_function(package, function)?
                }
                ParserState::FunctionBody { package, function } => {
                    self.parse_function_body(package, function)?
                }
                ParserState::Done => break,
            };
        }
        Ok(self.packages)
    }

    /// Receives the next token, consuming the lookahead slot first.
    ///
    /// A closed channel is reported as `Eof`; a lexical `Error` token is
    /// converted into a fatal [`ParseError`] here.
    pub(super) fn next(&mut self) -> Result<Token, ParseError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self
                .input
                .recv()
                .unwrap_or_else(|_| Token::new(TokenKind::Eof, "", self.last_span)),
        };
        self.last_span = token.span;
        if token.kind == TokenKind::Error {
            return Err(ParseError::new(token.value, token.span));
        }
        Ok(token)
    }

    /// Peeks at the next token without consuming it.
    pub(super) fn peek(&mut self) -> Result<&Token, ParseError> {
        if self.peeked.is_none() {
            let token = self
                .input
                .recv()
                .unwrap_or_else(|_| Token::new(TokenKind::Eof, "", self.last_span));
            if token.kind == TokenKind::Error {
                self.last_span = token.span;
                return Err(ParseError::new(token.value, token.span));
            }
            self.peeked = Some(token);
        }
        match self.peeked.as_ref() {
            Some(token) => Ok(token),
            // The slot was filled right above.
            None => Err(ParseError::internal("Peek slot is empty", self.last_span)),
        }
    }

    /// Consumes the next token if its payload equals `valid`.
    pub(super) fn accept_value(&mut self, valid: &str) -> Result<bool, ParseError> {
        if self.peek()?.value == valid {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Consumes the next token, requiring its payload to equal `valid`.
    pub(super) fn expect_value(&mut self, valid: &str) -> Result<(), ParseError> {
        let token = self.next()?;
        if token.value == valid {
            Ok(())
        } else {
            Err(ParseError::new(
                format!("Expected '{}', found {}", valid, token),
                token.span,
            ))
        }
    }

    /// Consumes the next token, requiring the given kind, and returns it.
    pub(super) fn expect_kind(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.next()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::new(
                format!("Expected {:?}, found {}", kind, token),
                token.span,
            ))
        }
    }

    /// Registers a parsed package under its name.
    pub(super) fn add_package(&mut self, package: Package) {
        self.packages.insert(package.name.clone(), package);
    }

    /// Returns a mutable handle to a registered package.
    pub(super) fn package_mut(&mut self, name: &str) -> Option<&mut Package> {
        self.packages.get_mut(name)
    }
}
