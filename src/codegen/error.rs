//! Code generation error types.

/// An error that occurred during lowering.
///
/// Lowering errors name the offending symbol or operator; AST nodes carry no
/// source spans, so positions are not available at this stage.
#[derive(Debug)]
pub struct CodegenError {
    /// A human-readable description of the error.
    pub message: String,
}

impl CodegenError {
    /// Creates a new error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        CodegenError {
            message: message.into(),
        }
    }

    /// Creates an error for a condition only reachable through a compiler
    /// bug (e.g. an LLVM builder call failing on well-formed input).
    pub(crate) fn internal(what: &str, err: impl std::fmt::Display) -> Self {
        CodegenError {
            message: format!("Internal error: {}: {}. This is a compiler bug.", what, err),
        }
    }
}

impl std::fmt::Display for CodegenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CodegenError {}
