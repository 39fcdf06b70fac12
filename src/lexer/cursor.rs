//! Cursor management and character acceptance helpers for the lexer.
//!
//! These methods implement the start/pos/width discipline the state
//! functions are written against: `next` consumes one character, `backup`
//! un-consumes the most recent one, `ignore` drops the pending lexeme and
//! `emit` sends the pending lexeme as a token.

use crate::token::{Span, Token, TokenKind};

use super::Lexer;

impl<'a> Lexer<'a> {
    /// Returns the unconsumed remainder of the input.
    pub(super) fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Consumes and returns the next character, or `None` at end of input.
    pub(super) fn next(&mut self) -> Option<char> {
        let c = self.rest().chars().next()?;
        self.width = c.len_utf8();
        self.pos += self.width;
        Some(c)
    }

    /// Steps back over the most recently consumed character.
    ///
    /// Valid at most once per call to [`next`](Self::next).
    pub(super) fn backup(&mut self) {
        self.pos -= self.width;
        self.width = 0;
    }

    /// Drops the pending lexeme by moving the lexeme start to the scan position.
    pub(super) fn ignore(&mut self) {
        self.start = self.pos;
    }

    /// Returns the pending lexeme text.
    pub(super) fn current_lexeme(&self) -> &'a str {
        &self.input[self.start..self.pos]
    }

    /// Returns the character immediately before the most recently consumed one.
    ///
    /// Used by the string state to decide whether a closing quote was
    /// escaped. Returns `None` when the lexeme has no such character.
    pub(super) fn last_lexed(&self) -> Option<char> {
        self.input[..self.pos - self.width].chars().next_back()
    }

    /// Consumes the next character if it is contained in `valid`.
    pub(super) fn accept(&mut self, valid: &str) -> bool {
        match self.next() {
            Some(c) if valid.contains(c) => true,
            Some(_) => {
                self.backup();
                false
            }
            None => false,
        }
    }

    /// Consumes a run of characters contained in `valid`.
    pub(super) fn accept_many(&mut self, valid: &str) {
        while let Some(c) = self.next() {
            if !valid.contains(c) {
                self.backup();
                return;
            }
        }
    }

    /// Consumes characters up to and including the first one contained in
    /// `until`.
    ///
    /// Returns `false` if the input ends before any such character appears;
    /// the caller is responsible for surfacing that as a lexical error.
    pub(super) fn accept_until_one_of(&mut self, until: &str) -> bool {
        while let Some(c) = self.next() {
            if until.contains(c) {
                return true;
            }
        }
        false
    }

    /// Emits the pending lexeme as a token of the given kind.
    ///
    /// Identifier and keyword payloads are upper-cased; all other kinds keep
    /// the original slice. Returns `false` when the consumer has gone away,
    /// signalling the state machine to stop.
    pub(super) fn emit(&mut self, kind: TokenKind) -> bool {
        let value = match kind {
            TokenKind::Identifier | TokenKind::Keyword => {
                self.current_lexeme().to_uppercase()
            }
            _ => self.current_lexeme().to_string(),
        };
        let token = Token::new(kind, value, Span::new(self.start, self.pos));
        self.start = self.pos;
        self.sender.send(token).is_ok()
    }

    /// Emits a fatal [`TokenKind::Error`] token carrying `message`.
    pub(super) fn emit_error(&mut self, message: String) {
        let token = Token::new(TokenKind::Error, message, Span::new(self.start, self.pos));
        // The lexer terminates right after this, so a closed channel needs
        // no special handling.
        let _ = self.sender.send(token);
    }
}
