//! Lexical analyzer for the PL/SQL subset.
//!
//! This module provides the [`Lexer`], a state-function tokenizer that
//! publishes its output to a bounded channel. The lexer is the producer half
//! of the lex/parse pipeline: it runs on its own thread and suspends when the
//! channel is full, while the parser drains tokens in strict source order.
//!
//! # Overview
//!
//! The lexer performs the following tasks:
//! - Scans the input character by character through a small cursor API
//! - Recognizes identifiers, keywords, numeric and string literals,
//!   operators and separators
//! - Upper-cases identifier and keyword payloads at emission
//! - Skips whitespace and `--` line comments
//!
//! # State functions
//!
//! Each lexer state inspects the input, emits zero or more tokens and
//! returns the next state. States are expressed as the [`LexState`] enum and
//! dispatched through a match in [`Lexer::run`]:
//!
//! - `Text` - skip whitespace/comments, classify the next character
//! - `Operator` - emit an operator, greedily assembling `:=`
//! - `Separator` - emit a single separator character
//! - `Identifier` - consume an identifier run, classify keyword vs identifier
//! - `Str` - consume a single-quoted string, honoring `\'` escapes
//! - `Numeric` - consume a digit run
//! - `Done` - terminal; the channel is closed by dropping the sender
//!
//! An unrecognizable character emits a single
//! [`Error`](crate::token::TokenKind::Error) token and terminates the lexer;
//! the consumer must treat it as fatal.
//!
//! # Module Structure
//!
//! - [`cursor`] - position management and character acceptance helpers
//! - [`state`] - the state functions
//! - `tests` - unit tests (test-only)
//!
//! # See Also
//!
//! * [`crate::token`] - Token type definitions
//! * [`crate::parser`] - Parser that consumes the token stream

mod cursor;
mod state;

#[cfg(test)]
mod tests;

pub use state::LexState;

use crossbeam::channel::{Receiver, Sender, bounded};

use crate::token::Token;

/// Capacity of the lexer→parser token channel.
///
/// The bound is what makes the pipeline cooperative: a full channel suspends
/// the lexer until the parser catches up.
pub const TOKEN_CHANNEL_BOUND: usize = 64;

/// A state-function lexer that tokenizes PL/SQL source code.
///
/// The lexer tracks the start of the current lexeme and the scan position as
/// byte offsets into the input, mirroring the cursor/emit discipline of a
/// classic state-function tokenizer. Tokens are delivered through the
/// channel handed to [`Lexer::new`].
///
/// # Lifetime
///
/// The `'a` lifetime parameter ties the lexer to the input string slice,
/// ensuring the input remains valid while the lexer is in use.
pub struct Lexer<'a> {
    /// The input source code being tokenized.
    pub(super) input: &'a str,
    /// Byte offset where the current lexeme starts.
    pub(super) start: usize,
    /// Current scan position (byte offset) in the input.
    pub(super) pos: usize,
    /// Byte width of the most recently consumed character.
    pub(super) width: usize,
    /// Producer side of the token channel.
    pub(super) sender: Sender<Token>,
}

impl<'a> Lexer<'a> {
    /// Creates a new `Lexer` over `input` that emits into `sender`.
    pub fn new(input: &'a str, sender: Sender<Token>) -> Self {
        Lexer {
            input,
            start: 0,
            pos: 0,
            width: 0,
            sender,
        }
    }

    /// Spawns the lexer on its own thread and returns the consumer side of
    /// the bounded token channel.
    ///
    /// The thread owns the source text and terminates after emitting the
    /// final `Eof` (or a fatal `Error`) token; dropping the sender closes
    /// the channel, which the parser observes as end of input. If the
    /// consumer goes away first (e.g. the parser aborted on an error), the
    /// lexer stops quietly.
    pub fn spawn(source: String) -> Receiver<Token> {
        let (sender, receiver) = bounded(TOKEN_CHANNEL_BOUND);
        // Deliberately detached; the thread exits once it has emitted Eof
        // or Error, or once the receiver is dropped.
        let _ = std::thread::spawn(move || {
            Lexer::new(&source, sender).run();
        });
        receiver
    }

    /// Runs the state machine to completion.
    ///
    /// Dispatches through the state enum until a state function returns
    /// [`LexState::Done`].
    pub fn run(mut self) {
        let mut lex_state = LexState::Text;
        loop {
            lex_state = match lex_state {
                LexState::Text => self.lex_text(),
                LexState::Operator => self.lex_operator(),
                LexState::Separator => self.lex_separator(),
                LexState::Identifier => self.lex_identifier(),
                LexState::Str => self.lex_string(),
                LexState::Numeric => self.lex_numeric(),
                LexState::Done => break,
            };
        }
    }
}
