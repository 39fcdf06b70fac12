//! The top-level parser state functions.
//!
//! Each state consumes tokens and returns the next state, threading the
//! package name and the procedure under construction through the state
//! payloads. Block bodies are parsed by recursion in [`super::stmt`].

use crate::ast::{Block, Function, Package, ParamMode};
use crate::token::TokenKind;

use super::Parser;
use super::error::ParseError;
use super::stmt::BlockEnd;

/// The states of the parser state machine.
///
/// The payloads replace the untyped argument vector of a function-pointer
/// table: each state owns exactly the context it needs.
pub(super) enum ParserState {
    /// Expect the start of a package: `CREATE OR REPLACE PACKAGE`.
    Text,
    /// Expect `BODY <name> AS` and register the package.
    CreatePackage,
    /// Inside a package: expect `PROCEDURE` or the closing `END <name>; /`.
    InsidePackage { package: String },
    /// After `PROCEDURE <name>`: expect a parameter list or `IS`.
    Function { package: String, function: Function },
    /// After `IS`: expect local declarations, then `BEGIN` and the body.
    FunctionBody { package: String, function: Function },
    /// Terminal state.
    Done,
}

impl Parser {
    /// `CREATE OR REPLACE PACKAGE` → [`ParserState::CreatePackage`].
    pub(super) fn parse_text(&mut self) -> Result<ParserState, ParseError> {
        let token = self.next()?;
        if !token.is(TokenKind::Keyword, "CREATE") {
            return Err(ParseError::new(
                format!("Expected 'CREATE', found {}", token),
                token.span,
            ));
        }
        self.expect_value("OR")?;
        self.expect_value("REPLACE")?;
        let token = self.next()?;
        if !token.is(TokenKind::Keyword, "PACKAGE") {
            return Err(ParseError::new(
                format!("Expected 'PACKAGE', found {}", token),
                token.span,
            ));
        }
        Ok(ParserState::CreatePackage)
    }

    /// `BODY <name> AS` → [`ParserState::InsidePackage`].
    pub(super) fn parse_create_package(&mut self) -> Result<ParserState, ParseError> {
        self.expect_value("BODY")?;
        let name_token = self.expect_kind(TokenKind::Identifier)?;
        self.expect_value("AS")?;
        let package = Package::new(name_token.value.clone());
        log::debug!("found package: {}", package.name);
        self.add_package(package);
        Ok(ParserState::InsidePackage {
            package: name_token.value,
        })
    }

    /// `PROCEDURE <name>` opens a procedure; `END <name>; /` seals the
    /// package and either ends the parse or starts over for the next one.
    pub(super) fn parse_inside_package(
        &mut self,
        package: String,
    ) -> Result<ParserState, ParseError> {
        let token = self.next()?;
        match token.value.as_str() {
            "PROCEDURE" => {
                let name = self.expect_kind(TokenKind::Identifier)?;
                let function = Function::new(name.value);
                Ok(ParserState::Function { package, function })
            }
            "END" => {
                self.expect_value(&package)?;
                self.expect_value(";")?;
                self.expect_value("/")?;
                // Another `CREATE ... /` may follow in the same source file.
                if self.peek()?.kind == TokenKind::Eof {
                    Ok(ParserState::Done)
                } else {
                    Ok(ParserState::Text)
                }
            }
            _ => Err(ParseError::new(
                format!("Can't match lex item '{}'", token.value),
                token.span,
            )),
        }
    }

    /// Parses the optional parameter list; absence of `(` (i.e. the very
    /// next token is `IS`) means zero parameters.
    pub(super) fn parse_function(
        &mut self,
        package: String,
        mut function: Function,
    ) -> Result<ParserState, ParseError> {
        let token = self.next()?;
        if token.is(TokenKind::Separator, "(") {
            loop {
                let name = self.expect_kind(TokenKind::Identifier)?;
                let ownership = self.expect_kind(TokenKind::Identifier)?;
                let mode = ParamMode::parse(&ownership.value).ok_or_else(|| {
                    ParseError::new(
                        format!(
                            "Expected parameter ownership (IN, OUT or INOUT), found '{}'",
                            ownership.value
                        ),
                        ownership.span,
                    )
                })?;
                let ty = self.expect_kind(TokenKind::Identifier)?;
                function.add_param(name.value, mode, ty.value);

                let separator = self.next()?;
                match separator.value.as_str() {
                    "," => continue,
                    ")" => break,
                    _ => {
                        return Err(ParseError::new(
                            format!("Expected ',' or ')', found {}", separator),
                            separator.span,
                        ));
                    }
                }
            }
            self.expect_value("IS")?;
            Ok(ParserState::FunctionBody { package, function })
        } else if token.is(TokenKind::Keyword, "IS") {
            Ok(ParserState::FunctionBody { package, function })
        } else {
            Err(ParseError::new(
                format!("Expected '(' or 'IS', found {}", token),
                token.span,
            ))
        }
    }

    /// Parses local declarations and the `BEGIN ... END;` body, then hands
    /// the finished procedure to its package.
    pub(super) fn parse_function_body(
        &mut self,
        package: String,
        mut function: Function,
    ) -> Result<ParserState, ParseError> {
        // Locals: as long as the next token is an identifier, read
        // `name type := value ;`.
        while self.peek()?.kind == TokenKind::Identifier {
            let name = self.next()?;
            let ty = self.expect_kind(TokenKind::Identifier)?;
            self.expect_value(":=")?;
            let value = self.next()?;
            if value.kind != TokenKind::Numeric && value.kind != TokenKind::Str {
                return Err(ParseError::new(
                    format!("Expected a literal initializer, found {}", value),
                    value.span,
                ));
            }
            self.expect_value(";")?;
            function.add_local(name.value, ty.value, value.value);
        }

        let token = self.next()?;
        if !token.is(TokenKind::Keyword, "BEGIN") {
            return Err(ParseError::new(
                format!("Expected 'BEGIN', found {}", token),
                token.span,
            ));
        }

        let entry_name = format!("{}-entry", function.proto.name);
        let entry = function.add_block(Block::new(&entry_name));
        let (end, _last) = self.parse_block_body(&package, &mut function, entry)?;
        if end == BlockEnd::Else {
            return Err(ParseError::new(
                "Found 'ELSE' outside of an IF statement",
                self.last_span(),
            ));
        }

        log::debug!("parsed procedure {}.{}", package, function.proto.name);
        let span = self.last_span();
        self.package_mut(&package)
            .ok_or_else(|| {
                ParseError::internal(format!("Package '{}' vanished mid-parse", package), span)
            })?
            .add_function(function);
        Ok(ParserState::InsidePackage { package })
    }

    /// The span of the most recently delivered token.
    pub(super) fn last_span(&self) -> crate::token::Span {
        self.last_span
    }
}
