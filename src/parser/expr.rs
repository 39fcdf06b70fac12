//! Expression and call-argument parsing.

use crate::ast::{BinOp, Expr, FunctionCall};
use crate::token::{Token, TokenKind};

use super::Parser;
use super::error::ParseError;

impl Parser {
    /// Parses an expression starting at the next token.
    ///
    /// An expression is a string literal, a numeric literal, a variable, or
    /// a binary operation. Function calls in expression position are
    /// reserved and not implemented.
    pub(super) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let token = self.next()?;
        self.parse_expression_from(token)
    }

    /// Parses an expression whose first token has already been consumed.
    pub(super) fn parse_expression_from(&mut self, token: Token) -> Result<Expr, ParseError> {
        match token.kind {
            TokenKind::Str => Ok(Expr::StringLiteral(unquote(&token.value))),

            TokenKind::Numeric => {
                let value: i64 = token.value.parse().map_err(|_| {
                    ParseError::new(
                        format!("Can't convert '{}' into a number", token.value),
                        token.span,
                    )
                })?;
                Ok(Expr::NumericLiteral(value))
            }

            TokenKind::Identifier => {
                if self.peek()?.value == "(" {
                    Err(ParseError::new(
                        format!(
                            "Function call '{}(...)' in expression position is not implemented",
                            token.value
                        ),
                        token.span,
                    ))
                } else if self.peek()?.kind == TokenKind::Operator {
                    Ok(Expr::BinOp(Box::new(self.parse_binop_from(token)?)))
                } else {
                    Ok(Expr::Variable(token.value))
                }
            }

            _ => Err(ParseError::new(
                format!("Can't match lex item '{}'", token.value),
                token.span,
            )),
        }
    }

    /// Parses a binary operation starting at the next token.
    pub(super) fn parse_binop(&mut self) -> Result<BinOp, ParseError> {
        let left = self.next()?;
        self.parse_binop_from(left)
    }

    /// Parses a binary operation whose left operand token has already been
    /// consumed.
    ///
    /// The operand tokens are pulled off the channel before either side is
    /// interpreted, so the right operand may itself chain into another
    /// binary operation (`a - 1 - 2`).
    fn parse_binop_from(&mut self, left_token: Token) -> Result<BinOp, ParseError> {
        let op = self.next()?;
        if op.kind != TokenKind::Operator {
            return Err(ParseError::new(
                format!("Lex item '{}' is not an operator", op.value),
                op.span,
            ));
        }
        let right_token = self.next()?;

        let left = self.leaf_expression(left_token)?;
        let right = self.parse_expression_from(right_token)?;
        Ok(BinOp::new(left, op.value, right))
    }

    /// Interprets a single already-consumed token as a leaf expression.
    fn leaf_expression(&mut self, token: Token) -> Result<Expr, ParseError> {
        match token.kind {
            TokenKind::Str => Ok(Expr::StringLiteral(unquote(&token.value))),
            TokenKind::Numeric => {
                let value: i64 = token.value.parse().map_err(|_| {
                    ParseError::new(
                        format!("Can't convert '{}' into a number", token.value),
                        token.span,
                    )
                })?;
                Ok(Expr::NumericLiteral(value))
            }
            TokenKind::Identifier => Ok(Expr::Variable(token.value)),
            _ => Err(ParseError::new(
                format!("Can't match lex item '{}'", token.value),
                token.span,
            )),
        }
    }

    /// Parses `<module> . <function> ( args ) ;` with the module name and
    /// the dot already consumed.
    pub(super) fn parse_qualified_call(
        &mut self,
        module: String,
    ) -> Result<FunctionCall, ParseError> {
        let function = self.expect_kind(TokenKind::Identifier)?;
        let mut call = FunctionCall::new(module, function.value);
        self.expect_value("(")?;
        self.parse_call_args(&mut call)?;
        self.expect_value(";")?;
        Ok(call)
    }

    /// Parses `( args ) ;` of a local call with the callee name and the
    /// opening parenthesis already consumed.
    ///
    /// Local calls are qualified with the enclosing package name so every
    /// call resolves through a `<module>.<function>` name at lowering time.
    pub(super) fn parse_local_call(
        &mut self,
        package: &str,
        function: String,
    ) -> Result<FunctionCall, ParseError> {
        let mut call = FunctionCall::new(package, function);
        self.parse_call_args(&mut call)?;
        self.expect_value(";")?;
        Ok(call)
    }

    /// Parses a comma-separated argument list up to the closing `)`.
    fn parse_call_args(&mut self, call: &mut FunctionCall) -> Result<(), ParseError> {
        while !self.accept_value(")")? {
            let expr = self.parse_expression()?;
            call.add_arg(expr);
            self.accept_value(",")?;
        }
        Ok(())
    }
}

/// Strips the enclosing single quotes from a string token payload.
///
/// Escape sequences inside the literal are left untouched.
fn unquote(value: &str) -> String {
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value)
        .to_string()
}
