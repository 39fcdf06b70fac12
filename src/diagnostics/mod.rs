//! Error reporting for the CLI.
//!
//! Parse errors carry a byte span and are rendered as labelled source
//! reports through `ariadne`; every other phase prints its diagnostic text
//! plainly. Reporting never fails the process by itself - if the fancy
//! report can't be rendered, the plain text is printed instead.

use std::ops::Range;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

use crate::driver::CompileError;

fn print_range_report(
    filename: &str,
    source: &str,
    span_range: Range<usize>,
    message: &str,
) -> std::io::Result<()> {
    Report::build(ReportKind::Error, (filename, span_range.clone()))
        .with_config(Config::default().with_index_type(IndexType::Byte))
        .with_message(message)
        .with_label(
            Label::new((filename, span_range))
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish()
        .eprint((filename, Source::from(source)))
}

/// Clamps a span to the source so ariadne never sees an out-of-range label
/// (synthetic end-of-input tokens may point one past the end).
fn clamp_range(start: usize, end: usize, source: &str) -> Range<usize> {
    let start = start.min(source.len());
    let end = end.clamp(start, source.len());
    if start == end && start < source.len() {
        start..start + 1
    } else {
        start..end
    }
}

/// Reports a compile error to stderr.
pub(crate) fn report_error(filename: &str, source: &str, error: &CompileError) {
    match error {
        CompileError::Parse(parse_error) => {
            let range = clamp_range(parse_error.span.start, parse_error.span.end, source);
            if let Err(report_err) =
                print_range_report(filename, source, range, &parse_error.message)
            {
                let (line, column) = parse_error.span.line_col(source);
                eprintln!(
                    "Error: {} (at {}:{}:{})",
                    parse_error.message, filename, line, column
                );
                eprintln!("(Failed to display detailed error report: {})", report_err);
            }
        }
        CompileError::Codegen(_)
        | CompileError::FileRead { .. }
        | CompileError::IrWrite { .. }
        | CompileError::Clang(_) => {
            eprintln!("Error: {}", error);
        }
    }
}
