//! Compilation driver.
//!
//! Orchestrates the whole pipeline: read the source file, spawn the lexer
//! and drain it through the parser, lower every package to LLVM IR, emit
//! the runtime prelude and `main` bridge, serialize the textual IR to the
//! fixed intermediate file and hand it to the external C-family driver.
//!
//! Everything in here is fallible and reported through [`CompileError`];
//! the CLI in `main.rs` is the only place that prints and exits.

mod clang;

use std::path::Path;

use inkwell::context::Context;

use plsqlc::codegen::{Codegen, CodegenError};
use plsqlc::lexer::Lexer;
use plsqlc::parser::{ParseError, Parser};

/// Fixed name of the intermediate textual IR file, created in the current
/// working directory.
pub const IR_FILE_NAME: &str = "_temp_llvm_.ll";

/// A compilation error from any phase of the pipeline.
///
/// This enum unifies errors from file I/O, parsing (including lexical
/// errors surfaced through the token channel), lowering and the external
/// compiler invocation.
pub(crate) enum CompileError {
    /// Failed to read the source file.
    FileRead {
        path: String,
        source: std::io::Error,
    },
    /// A lexical or syntactic error.
    Parse(ParseError),
    /// A lowering error.
    Codegen(CodegenError),
    /// Failed to write the intermediate IR file.
    IrWrite {
        path: String,
        source: std::io::Error,
    },
    /// The external compiler failed.
    Clang(ClangError),
}

/// An error from the external C-family compiler invocation.
pub(crate) enum ClangError {
    /// A path involved in the invocation is not valid UTF-8.
    PathNotUtf8 { path: std::path::PathBuf },
    /// Failed to execute `clang` at all.
    ExecutionFailed(std::io::Error),
    /// `clang` exited with a non-zero status.
    Failed { exit_code: String, output: String },
    /// `clang` succeeded but produced output; any diagnostic is fatal.
    UnexpectedOutput { output: String },
}

impl std::fmt::Display for ClangError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClangError::PathNotUtf8 { path } => {
                write!(f, "Path '{}' is not valid UTF-8", path.display())
            }
            ClangError::ExecutionFailed(io_err) => {
                write!(f, "Failed to run clang: {}", io_err)
            }
            ClangError::Failed { exit_code, output } => {
                write!(f, "clang failed with exit code {}", exit_code)?;
                if !output.is_empty() {
                    write!(f, "\n{}", output)?;
                }
                Ok(())
            }
            ClangError::UnexpectedOutput { output } => {
                write!(f, "clang produced diagnostics:\n{}", output)
            }
        }
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::FileRead { path, source } => {
                write!(f, "Failed to read file '{}': {}", path, source)
            }
            CompileError::Parse(e) => write!(f, "{}", e),
            CompileError::Codegen(e) => write!(f, "{}", e),
            CompileError::IrWrite { path, source } => {
                write!(f, "Failed to write IR file '{}': {}", path, source)
            }
            CompileError::Clang(e) => write!(f, "{}", e),
        }
    }
}

/// Context needed to report an error against its source file.
#[derive(Clone)]
struct CompileContext {
    filename: String,
    source: String,
}

impl CompileContext {
    fn new(filename: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            source: source.into(),
        }
    }

    /// Combines this context with an error to create a reportable error.
    fn with_error(self, error: CompileError) -> CompileErrorWithContext {
        CompileErrorWithContext {
            context: self,
            error,
        }
    }
}

/// A compilation error with the context needed for reporting.
pub(crate) struct CompileErrorWithContext {
    context: CompileContext,
    error: CompileError,
}

impl CompileErrorWithContext {
    pub(crate) fn filename(&self) -> &str {
        &self.context.filename
    }

    pub(crate) fn source(&self) -> &str {
        &self.context.source
    }

    pub(crate) fn error(&self) -> &CompileError {
        &self.error
    }
}

/// Compiles a source file into a native executable.
///
/// # Pipeline
///
/// 1. Read the source file
/// 2. Spawn the lexer thread; it publishes tokens to a bounded channel
/// 3. Run the parser to completion over that channel
/// 4. Emit the runtime prelude, lower every package, emit the `main` bridge
/// 5. Serialize textual IR (optionally echoing it to stderr)
/// 6. Write the fixed intermediate file and invoke
///    `clang <ir> -Wno-override-module -o <output> -O3`
/// 7. Delete the intermediate file if requested
///
/// # Arguments
///
/// * `input` - path of the source file
/// * `output` - path of the executable to produce
/// * `print_ir` - echo the textual IR to stderr
/// * `delete_ir` - remove the intermediate IR file afterwards
pub(crate) fn compile(
    input: &Path,
    output: &Path,
    print_ir: bool,
    delete_ir: bool,
) -> Result<(), Box<CompileErrorWithContext>> {
    let input_display = input.display().to_string();
    let source = std::fs::read_to_string(input).map_err(|e| {
        Box::new(
            CompileContext::new(&input_display, "").with_error(CompileError::FileRead {
                path: input_display.clone(),
                source: e,
            }),
        )
    })?;

    let context = CompileContext::new(&input_display, source.clone());
    compile_source(&source, output, print_ir, delete_ir)
        .map_err(|e| Box::new(context.with_error(e)))
}

/// The pure compilation pipeline; error reporting is the caller's concern.
fn compile_source(
    source: &str,
    output: &Path,
    print_ir: bool,
    delete_ir: bool,
) -> Result<(), CompileError> {
    // Lex and parse: the lexer produces into a bounded channel from its own
    // thread, the parser drains it here.
    let tokens = Lexer::spawn(source.to_string());
    let packages = Parser::new(tokens).parse().map_err(CompileError::Parse)?;

    // Lower to LLVM IR.
    let llvm_context = Context::create();
    let mut codegen = Codegen::new(&llvm_context, "plsqlc");
    codegen
        .emit_runtime_prelude()
        .map_err(CompileError::Codegen)?;
    codegen.compile(&packages).map_err(CompileError::Codegen)?;
    codegen.emit_main_bridge().map_err(CompileError::Codegen)?;

    let ir = codegen.print_ir();
    if print_ir {
        eprintln!("{}", ir);
    }

    std::fs::write(IR_FILE_NAME, &ir).map_err(|e| CompileError::IrWrite {
        path: IR_FILE_NAME.to_string(),
        source: e,
    })?;

    // Hand the textual IR to the external driver. The intermediate file is
    // removed on the failure path too, unless the user asked to keep it.
    let result = clang::compile_ir(Path::new(IR_FILE_NAME), output);
    if delete_ir {
        let _ = std::fs::remove_file(IR_FILE_NAME);
    }
    result.map_err(CompileError::Clang)?;

    log::debug!("built {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_file_read_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CompileError::FileRead {
            path: "test.sql".to_string(),
            source: io_err,
        };
        assert_eq!(
            err.to_string(),
            "Failed to read file 'test.sql': file not found"
        );
    }

    #[test]
    fn test_display_clang_execution_failed() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "clang not found");
        let err = ClangError::ExecutionFailed(io_err);
        assert_eq!(err.to_string(), "Failed to run clang: clang not found");
    }

    #[test]
    fn test_display_clang_failed_with_output() {
        let err = ClangError::Failed {
            exit_code: "1".to_string(),
            output: "some error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "clang failed with exit code 1\nsome error"
        );
    }

    #[test]
    fn test_display_clang_failed_empty_output() {
        let err = ClangError::Failed {
            exit_code: "1".to_string(),
            output: "".to_string(),
        };
        assert_eq!(err.to_string(), "clang failed with exit code 1");
    }

    #[test]
    fn test_display_clang_unexpected_output() {
        let err = ClangError::UnexpectedOutput {
            output: "warning: something".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "clang produced diagnostics:\nwarning: something"
        );
    }

    #[test]
    fn test_display_ir_write_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = CompileError::IrWrite {
            path: IR_FILE_NAME.to_string(),
            source: io_err,
        };
        assert_eq!(
            err.to_string(),
            "Failed to write IR file '_temp_llvm_.ll': denied"
        );
    }
}
