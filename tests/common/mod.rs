//! Common test utilities for plsqlc integration tests.
//!
//! The end-to-end helpers drive the built `plsqlc` binary exactly like a
//! user would: compile a source file in a temporary directory (which also
//! keeps the fixed intermediate IR filename from colliding between
//! parallel tests) and run the produced executable.

// Each test file is compiled as a separate crate, so not all helpers are
// used in every test file.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::{TempDir, tempdir};

/// Returns the path to the plsqlc binary built by cargo.
pub fn plsqlc_binary() -> String {
    env!("CARGO_BIN_EXE_plsqlc").to_string()
}

/// Returns an executable filename with the correct platform extension.
pub fn executable_name(name: &str) -> String {
    format!("{}{}", name, std::env::consts::EXE_SUFFIX)
}

/// Compiles `source` inside `dir` with the given extra CLI arguments.
///
/// Writes the source to `program.sql`, invokes the compiler with `dir` as
/// working directory and returns the process output.
pub fn compile_in_dir(
    dir: &Path,
    source: &str,
    extra_args: &[&str],
) -> std::process::Output {
    let source_path = dir.join("program.sql");
    fs::write(&source_path, source).expect("write source file");

    let executable = dir.join(executable_name("program"));
    Command::new(plsqlc_binary())
        .current_dir(dir)
        .args([
            "-i",
            source_path.to_str().expect("source path is UTF-8"),
            "-o",
            executable.to_str().expect("executable path is UTF-8"),
        ])
        .args(extra_args)
        .output()
        .expect("run plsqlc")
}

/// Compiles `source` to an executable, returning the temp dir that owns it.
pub fn compile(source: &str) -> Result<(TempDir, PathBuf), String> {
    let dir = tempdir().map_err(|e| e.to_string())?;
    let output = compile_in_dir(dir.path(), source, &[]);
    if !output.status.success() {
        return Err(format!(
            "compilation failed (exit {:?}):\n[stdout] {}\n[stderr] {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        ));
    }
    let executable = dir.path().join(executable_name("program"));
    Ok((dir, executable))
}

/// Runs an executable and returns its stdout.
pub fn run_executable(executable_path: &Path) -> Result<String, String> {
    let output = Command::new(executable_path)
        .output()
        .map_err(|e| format!("Failed to run executable: {}", e))?;

    if !output.status.success() {
        return Err(format!(
            "Executable failed with exit code: {:?}",
            output.status.code()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Compiles a source string and runs the produced binary, returning stdout.
///
/// This drives the complete pipeline: lexing, parsing, lowering, textual IR
/// serialization, clang and execution.
pub fn compile_and_run(source: &str) -> Result<String, String> {
    let (_dir, executable) = compile(source)?;
    run_executable(&executable)
}

/// Compiles a source string expected to fail, returning the stderr text.
pub fn compile_error(source: &str) -> String {
    let dir = tempdir().expect("create temp dir");
    let output = compile_in_dir(dir.path(), source, &[]);
    assert!(
        !output.status.success(),
        "expected compilation to fail for:\n{}",
        source
    );
    String::from_utf8_lossy(&output.stderr).into_owned()
}
