//! Procedures, prototypes, parameters and locals.

use super::block::{Block, BlockId};

/// Parameter ownership, as written between the parameter name and its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMode {
    In,
    Out,
    InOut,
}

impl ParamMode {
    /// Parses the upper-cased source form (`IN`, `OUT`, `INOUT`).
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "IN" => Some(ParamMode::In),
            "OUT" => Some(ParamMode::Out),
            "INOUT" => Some(ParamMode::InOut),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParamMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamMode::In => write!(f, "IN"),
            ParamMode::Out => write!(f, "OUT"),
            ParamMode::InOut => write!(f, "INOUT"),
        }
    }
}

/// A formal parameter: `name ownership type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionParam {
    pub name: String,
    pub mode: ParamMode,
    /// The source type name (`INT`, `VARCHAR`), upper-cased.
    pub ty: String,
}

/// A local declaration: `name type := value ;`.
///
/// The initializer is kept as source text; it is interpreted according to
/// the declared type during lowering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionLocal {
    pub name: String,
    /// The source type name (`INT`, `VARCHAR`), upper-cased.
    pub ty: String,
    /// The raw initializer text (string initializers keep their quotes).
    pub init: String,
}

/// A procedure prototype: name and formal parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionProto {
    pub name: String,
    pub params: Vec<FunctionParam>,
}

impl FunctionProto {
    pub fn new(name: impl Into<String>) -> Self {
        FunctionProto {
            name: name.into(),
            params: Vec::new(),
        }
    }
}

/// A procedure: prototype, locals and basic blocks.
///
/// `blocks[0]` is the entry block. A procedure with at least one local
/// additionally acquires a synthetic `locals` IR block during lowering,
/// which branches unconditionally into the entry block.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub proto: FunctionProto,
    pub locals: Vec<FunctionLocal>,
    pub blocks: Vec<Block>,
    /// Procedures return no value. The only callable form the parser
    /// currently produces; lowering relies on it for the void return type.
    pub is_procedure: bool,
}

impl Function {
    /// Creates an empty procedure with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Function {
            proto: FunctionProto::new(name),
            locals: Vec::new(),
            blocks: Vec::new(),
            is_procedure: true,
        }
    }

    /// Appends a formal parameter to the prototype.
    pub fn add_param(&mut self, name: String, mode: ParamMode, ty: String) {
        self.proto.params.push(FunctionParam { name, mode, ty });
    }

    /// Appends a local declaration.
    pub fn add_local(&mut self, name: String, ty: String, init: String) {
        self.locals.push(FunctionLocal { name, ty, init });
    }

    /// Appends a block, preserving source order, and returns its id.
    pub fn add_block(&mut self, block: Block) -> BlockId {
        let id = block.id;
        self.blocks.push(block);
        id
    }

    /// Looks up a block by id.
    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_mode_parse() {
        assert_eq!(ParamMode::parse("IN"), Some(ParamMode::In));
        assert_eq!(ParamMode::parse("OUT"), Some(ParamMode::Out));
        assert_eq!(ParamMode::parse("INOUT"), Some(ParamMode::InOut));
        assert_eq!(ParamMode::parse("in"), None);
        assert_eq!(ParamMode::parse("REF"), None);
    }

    #[test]
    fn test_add_block_preserves_order() {
        let mut function = Function::new("MAIN");
        let first = function.add_block(Block::new("entry"));
        let second = function.add_block(Block::new("merge"));
        assert_eq!(function.blocks[0].id, first);
        assert_eq!(function.blocks[1].id, second);
        assert!(function.block_mut(first).is_some());
    }
}
