//! Abstract Syntax Tree definitions for the PL/SQL subset.
//!
//! The AST is a plain value tree produced by the parser and consumed by the
//! code generator:
//!
//! - [`Package`] - a named group of procedures, the top-level unit
//! - [`Function`] - a procedure: prototype, locals and basic blocks
//! - [`Block`] - a named basic block with instructions and an optional
//!   terminator; blocks are identified by a globally unique [`BlockId`]
//! - [`Instruction`] / [`Terminator`] - straight-line work vs control flow
//! - [`Expr`] - expressions, each carrying an [`ExprKind`] tag used for
//!   type-driven dispatch during lowering
//!
//! # Module Structure
//!
//! - [`package`] - packages
//! - [`function`] - procedures, prototypes, parameters and locals
//! - [`block`] - basic blocks, instructions and terminators
//! - [`expr`] - expressions
//!
//! # See Also
//!
//! * [`crate::parser`] - Produces this tree
//! * [`crate::codegen`] - Lowers this tree to LLVM IR

mod block;
mod expr;
mod function;
mod package;

pub use block::{Assignment, Block, BlockId, Instruction, Terminator};
pub use expr::{BinOp, Expr, ExprKind, FunctionCall};
pub use function::{Function, FunctionLocal, FunctionParam, FunctionProto, ParamMode};
pub use package::Package;
