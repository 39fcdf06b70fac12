//! The plsqlc compiler CLI.
//!
//! This binary compiles a PL/SQL-subset source file into a native
//! executable and delegates orchestration to the driver module.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

mod diagnostics;
mod driver;

/// Command-line interface for the plsqlc compiler.
#[derive(Parser)]
#[command(name = "plsqlc")]
#[command(about = "A PL/SQL-subset to native-code compiler", long_about = None)]
struct Cli {
    /// Path to the input source file (alternative to the positional form).
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: Option<PathBuf>,

    /// Path to the input source file.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Path of the output binary.
    #[arg(short = 'o', long = "output", value_name = "FILE", default_value = "out")]
    output: PathBuf,

    /// Print the generated LLVM IR to stderr.
    #[arg(long = "print-ir", default_value_t = false)]
    print_ir: bool,

    /// Delete the intermediate IR file after the external compiler ran.
    #[arg(
        long = "delete-ir",
        value_name = "BOOL",
        default_value_t = true,
        action = ArgAction::Set
    )]
    delete_ir: bool,
}

/// Entry point for the plsqlc compiler.
fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .env()
        .init()
        .ok();

    let cli = Cli::parse();

    let input = match cli.input.or(cli.file) {
        Some(path) => path,
        None => {
            eprintln!("Error: no input file given (use '-i <FILE>' or a positional argument)");
            std::process::exit(1);
        }
    };

    if !input.exists() {
        eprintln!("Error: file '{}' doesn't exist", input.display());
        std::process::exit(1);
    }

    if let Err(error) = driver::compile(&input, &cli.output, cli.print_ir, cli.delete_ir) {
        diagnostics::report_error(error.filename(), error.source(), error.error());
        std::process::exit(1);
    }
}
