//! The lexer state functions.
//!
//! Each state inspects the input through the cursor API, emits zero or more
//! tokens and returns the next state. The character classes are exact:
//! identifiers are ASCII letters followed by letters, digits and `_`;
//! separators are `;(),/`; operators are `<>:.=-` (`:` is an operator so
//! that `:=` can be assembled); whitespace is space, tab, LF and CR.

use crate::token::{TokenKind, is_keyword};

use super::Lexer;

/// Leader of a line comment; the comment runs to end of line.
const COMMENT_TOKEN: &str = "--";

/// Characters that may appear after the first character of an identifier.
const IDENTIFIER_CONTINUATION: &str =
    "qwertyuiopasdfghjklzxcvbnmQWERTYUIOPASDFGHJKLZXCVBNM1234567890_";

const NUMERIC_CHARS: &str = "1234567890";
const SEPARATOR_CHARS: &str = ";(),/";
// contains ':' so that ':=' can be found
const OPERATOR_CHARS: &str = "<>:.=-";

/// The states of the lexer state machine.
///
/// `Text` is the dispatching state; the others each handle one token shape
/// and hand control back to `Text`. `Done` terminates the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    /// Skip whitespace and comments, classify the next character.
    Text,
    /// Emit an operator token, greedily accepting a trailing `=`.
    Operator,
    /// Emit a single-character separator token.
    Separator,
    /// Consume an identifier run and classify it as keyword or identifier.
    Identifier,
    /// Consume a single-quoted string literal.
    Str,
    /// Consume a run of digits.
    Numeric,
    /// Terminal state.
    Done,
}

fn is_space(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\n' || c == '\r'
}

impl<'a> Lexer<'a> {
    /// Skips whitespace and comments, then dispatches on the next character.
    ///
    /// Comments may be separated from code by any amount of whitespace, so
    /// the two are skipped in a loop before the character is classified.
    pub(super) fn lex_text(&mut self) -> LexState {
        loop {
            if self.rest().starts_with(COMMENT_TOKEN) {
                self.pos += COMMENT_TOKEN.len();
                // A comment on the last line may run into end of input.
                self.accept_until_one_of("\n");
                self.ignore();
                continue;
            }

            match self.next() {
                None => {
                    self.emit(TokenKind::Eof);
                    return LexState::Done;
                }
                Some(c) if is_space(c) => self.ignore(),
                Some(c) if SEPARATOR_CHARS.contains(c) => return LexState::Separator,
                Some(c) if OPERATOR_CHARS.contains(c) => return LexState::Operator,
                Some('\'') => return LexState::Str,
                Some(c) if c.is_ascii_alphabetic() => {
                    self.backup();
                    return LexState::Identifier;
                }
                Some(c) if NUMERIC_CHARS.contains(c) => return LexState::Numeric,
                Some(c) => {
                    self.emit_error(format!("Found '{c}' but can't match a rule"));
                    return LexState::Done;
                }
            }
        }
    }

    /// Emits the single operator character consumed by `lex_text`,
    /// greedily accepting a trailing `=` to assemble `:=`.
    pub(super) fn lex_operator(&mut self) -> LexState {
        self.accept("=");
        if !self.emit(TokenKind::Operator) {
            return LexState::Done;
        }
        LexState::Text
    }

    /// Emits the single separator character consumed by `lex_text`.
    pub(super) fn lex_separator(&mut self) -> LexState {
        if !self.emit(TokenKind::Separator) {
            return LexState::Done;
        }
        LexState::Text
    }

    /// Consumes an identifier run and emits it as a keyword or identifier.
    ///
    /// Both are case-folded to upper case at emission, which is what makes
    /// the language case-insensitive.
    pub(super) fn lex_identifier(&mut self) -> LexState {
        self.accept_many(IDENTIFIER_CONTINUATION);
        let upper = self.current_lexeme().to_uppercase();
        let kind = if is_keyword(&upper) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        if !self.emit(kind) {
            return LexState::Done;
        }
        LexState::Text
    }

    /// Consumes a string literal up to the first unescaped closing quote.
    ///
    /// A `'` preceded by `\` continues the scan. The emitted payload keeps
    /// both enclosing quotes.
    pub(super) fn lex_string(&mut self) -> LexState {
        loop {
            if !self.accept_until_one_of("'") {
                self.emit_error("Unterminated string literal".to_string());
                return LexState::Done;
            }
            if self.last_lexed() != Some('\\') {
                break;
            }
        }
        if !self.emit(TokenKind::Str) {
            return LexState::Done;
        }
        LexState::Text
    }

    /// Consumes the remainder of a digit run.
    pub(super) fn lex_numeric(&mut self) -> LexState {
        self.accept_many(NUMERIC_CHARS);
        if !self.emit(TokenKind::Numeric) {
            return LexState::Done;
        }
        LexState::Text
    }
}
