//! External compiler invocation.
//!
//! The textual IR is handed to `clang`, which owns final code generation
//! and linking. Its stdout and stderr are captured; because the IR is
//! machine-generated, *any* diagnostic output indicates a compiler bug and
//! is treated as fatal, even on a zero exit status.

use std::path::Path;
use std::process::Command;

use super::ClangError;

/// Compiles a textual IR file into a native executable.
///
/// Runs `clang <ir> -Wno-override-module -o <output> -O3`. The
/// `-Wno-override-module` flag silences the target-triple override warning
/// for IR files that carry no triple.
pub(super) fn compile_ir(ir_path: &Path, output_path: &Path) -> Result<(), ClangError> {
    let ir_str = ir_path.to_str().ok_or_else(|| ClangError::PathNotUtf8 {
        path: ir_path.to_path_buf(),
    })?;
    let output_str = output_path.to_str().ok_or_else(|| ClangError::PathNotUtf8 {
        path: output_path.to_path_buf(),
    })?;

    let mut command = Command::new("clang");
    command.args([ir_str, "-Wno-override-module", "-o", output_str, "-O3"]);
    log::debug!("running {:?}", command);

    let output = command.output().map_err(ClangError::ExecutionFailed)?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    let combined = combined.trim().to_string();

    if !output.status.success() {
        return Err(ClangError::Failed {
            exit_code: output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            output: combined,
        });
    }

    if !combined.is_empty() {
        return Err(ClangError::UnexpectedOutput { output: combined });
    }

    Ok(())
}
