//! Block-body statement parsing.
//!
//! A block body is a statement sequence terminated by `END [IF|LOOP] ;` (or
//! interrupted by `ELSE` inside an IF). IF and WHILE recurse into freshly
//! created blocks and synthesize the connecting terminators; the statements
//! after such a construct accumulate into its merge block.

use crate::ast::{
    Assignment, Block, BlockId, Function, Instruction, Terminator,
};
use crate::token::TokenKind;

use super::Parser;
use super::error::ParseError;

/// How a block body ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BlockEnd {
    /// `END [IF|LOOP] ;`
    End,
    /// `ELSE` - only legal while parsing the then-branch of an IF.
    Else,
}

impl Parser {
    /// Parses statements into `block` until the body ends.
    ///
    /// Returns how the body ended together with the id of the block that was
    /// current when it did. Control-flow constructs advance the current
    /// block (statements after an IF or WHILE accumulate into the merge
    /// block), so the returned id is where the caller must attach the
    /// synthesized continuation terminator.
    pub(super) fn parse_block_body(
        &mut self,
        package: &str,
        function: &mut Function,
        block: BlockId,
    ) -> Result<(BlockEnd, BlockId), ParseError> {
        let mut current = block;
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Identifier => {
                    // A qualified call ('pkg.func(...)'), a local call
                    // ('func(...)') or an assignment ('a := ...').
                    let instruction = if self.accept_value(".")? {
                        Instruction::Call(self.parse_qualified_call(token.value)?)
                    } else if self.accept_value("(")? {
                        Instruction::Call(self.parse_local_call(package, token.value)?)
                    } else if self.accept_value(":=")? {
                        let expr = self.parse_expression()?;
                        self.expect_value(";")?;
                        Instruction::Assignment(Assignment {
                            target: token.value,
                            expr,
                        })
                    } else {
                        return Err(ParseError::new(
                            format!(
                                "Expected '.', '(' or ':=' after identifier '{}'",
                                token.value
                            ),
                            token.span,
                        ));
                    };
                    self.block_mut(function, current)?.add_instruction(instruction);
                }

                TokenKind::Keyword => match token.value.as_str() {
                    "END" => {
                        // Eat a potential trailing 'IF' or 'LOOP'.
                        self.accept_value("IF")?;
                        self.accept_value("LOOP")?;
                        self.expect_value(";")?;
                        return Ok((BlockEnd::End, current));
                    }

                    "ELSE" => {
                        return Ok((BlockEnd::Else, current));
                    }

                    "IF" => {
                        current = self.parse_if(package, function, current)?;
                    }

                    "WHILE" => {
                        current = self.parse_while(package, function, current)?;
                    }

                    _ => {
                        return Err(ParseError::new(
                            format!("Can't match lex item '{}'", token.value),
                            token.span,
                        ));
                    }
                },

                TokenKind::Eof => {
                    return Err(ParseError::new(
                        "Unexpected end of input inside a block (missing 'END;')",
                        token.span,
                    ));
                }

                _ => {
                    return Err(ParseError::new(
                        format!("Can't match lex item '{}'", token.value),
                        token.span,
                    ));
                }
            }
        }
    }

    /// Parses `IF cond THEN body [ELSE body] END IF;` and synthesizes the
    /// branch structure.
    ///
    /// The enclosing block terminates with a conditional branch into the
    /// then-block (false target: else-block if present, merge block
    /// otherwise); each branch body ends with an unconditional branch to the
    /// merge block. Returns the merge block, which becomes current.
    fn parse_if(
        &mut self,
        package: &str,
        function: &mut Function,
        enclosing: BlockId,
    ) -> Result<BlockId, ParseError> {
        let cond = self.parse_binop()?;
        self.expect_value("THEN")?;

        let then_block = function.add_block(Block::new("if-block"));
        let (end, then_last) = self.parse_block_body(package, function, then_block)?;

        let (false_target, merge) = match end {
            BlockEnd::Else => {
                let else_block = function.add_block(Block::new("else-block"));
                let (else_end, else_last) =
                    self.parse_block_body(package, function, else_block)?;
                if else_end == BlockEnd::Else {
                    return Err(ParseError::new(
                        "Found a second 'ELSE' in the same IF statement",
                        self.last_span(),
                    ));
                }
                let merge = function.add_block(Block::new("merge-block"));
                self.seal_with_branch(function, else_last, merge)?;
                (else_block, merge)
            }
            BlockEnd::End => {
                let merge = function.add_block(Block::new("merge-block"));
                (merge, merge)
            }
        };

        self.seal_with_branch(function, then_last, merge)?;
        self.block_mut(function, enclosing)?.terminator = Some(Terminator::CondBranch {
            cond,
            true_target: then_block,
            false_target,
        });

        Ok(merge)
    }

    /// Parses `WHILE cond LOOP body END LOOP;` and synthesizes the loop
    /// structure.
    ///
    /// The enclosing block and the loop tail both test the same condition
    /// and branch to {loop-block, merge-block}; the two terminators compare
    /// equal by value. Returns the merge block, which becomes current.
    fn parse_while(
        &mut self,
        package: &str,
        function: &mut Function,
        enclosing: BlockId,
    ) -> Result<BlockId, ParseError> {
        let cond = self.parse_binop()?;
        self.expect_value("LOOP")?;

        let loop_block = function.add_block(Block::new("loop-block"));
        let (end, loop_last) = self.parse_block_body(package, function, loop_block)?;
        if end == BlockEnd::Else {
            return Err(ParseError::new(
                "Found 'ELSE' inside a WHILE loop",
                self.last_span(),
            ));
        }

        let merge = function.add_block(Block::new("merge-block"));
        let back_edge = Terminator::CondBranch {
            cond,
            true_target: loop_block,
            false_target: merge,
        };
        self.block_mut(function, enclosing)?.terminator = Some(back_edge.clone());
        let tail = self.block_mut(function, loop_last)?;
        if tail.terminator.is_none() {
            tail.terminator = Some(back_edge);
        }

        Ok(merge)
    }

    /// Attaches `Branch(target)` to `block` unless it already terminates.
    fn seal_with_branch(
        &mut self,
        function: &mut Function,
        block: BlockId,
        target: BlockId,
    ) -> Result<(), ParseError> {
        let block = self.block_mut(function, block)?;
        if block.terminator.is_none() {
            block.terminator = Some(Terminator::Branch(target));
        }
        Ok(())
    }

    /// Looks up a block by id, mapping a miss to an internal error.
    fn block_mut<'f>(
        &mut self,
        function: &'f mut Function,
        id: BlockId,
    ) -> Result<&'f mut Block, ParseError> {
        let span = self.last_span();
        function
            .block_mut(id)
            .ok_or_else(|| ParseError::internal("Dangling block id", span))
    }
}
