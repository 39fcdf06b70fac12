//! Basic blocks, instructions and terminators.

use std::sync::atomic::{AtomicU32, Ordering};

use super::expr::{BinOp, Expr, FunctionCall};

static NEXT_BLOCK_ID: AtomicU32 = AtomicU32::new(0);

/// Stable identity of an AST block.
///
/// Branch targets and the AST-block→IR-block map are keyed by this id, never
/// by name: ids are unique for the lifetime of the process, which is what
/// makes forward branches and the two-phase lowering safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(u32);

impl BlockId {
    fn next() -> Self {
        BlockId(NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw counter value (used to build unique block names).
    pub fn index(&self) -> u32 {
        self.0
    }
}

/// A straight-line instruction inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `target := expr;`
    Assignment(Assignment),
    /// A qualified or local function call used as a statement.
    Call(FunctionCall),
}

/// An assignment statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// The assigned variable, upper-cased.
    pub target: String,
    /// The right-hand side.
    pub expr: Expr,
}

/// A block terminator.
///
/// Every emitted IR block ends with exactly one terminator; blocks whose AST
/// counterpart has none receive an implicit `ret void` during lowering.
#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    /// An unconditional branch.
    Branch(BlockId),
    /// A conditional branch on a binary comparison.
    ///
    /// WHILE synthesis attaches an equal `CondBranch` to both the loop
    /// predecessor and the loop tail, so the type is comparable by value.
    CondBranch {
        cond: BinOp,
        true_target: BlockId,
        false_target: BlockId,
    },
}

/// A basic block: ordered instructions plus an optional terminator.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Stable identity, unique for the process lifetime.
    pub id: BlockId,
    /// Display name, made globally unique by suffixing the id counter.
    pub name: String,
    /// Straight-line instructions in source order.
    pub instructions: Vec<Instruction>,
    /// The terminator, if the parser synthesized one.
    pub terminator: Option<Terminator>,
}

impl Block {
    /// Creates an empty block. The given base name is suffixed with the
    /// monotonic id counter so block names never collide.
    pub fn new(base_name: &str) -> Self {
        let id = BlockId::next();
        Block {
            id,
            name: format!("{}-{}", base_name, id.index()),
            instructions: Vec::new(),
            terminator: None,
        }
    }

    /// Appends an instruction.
    pub fn add_instruction(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }
}
