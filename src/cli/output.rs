//! Handles all user-facing output for the CLI.
//!
//! Status lines and the batch summary go to stdout; errors go to stderr,
//! either as a single line or as a full `miette` report.

use std::io::{IsTerminal, Write};
use std::path::Path;

use miette::GraphicalReportHandler;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use super::BatchSummary;
use crate::errors::TestlistError;

fn color_choice(is_terminal: bool) -> ColorChoice {
    if is_terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn stdout() -> StandardStream {
    StandardStream::stdout(color_choice(std::io::stdout().is_terminal()))
}

fn stderr() -> StandardStream {
    StandardStream::stderr(color_choice(std::io::stderr().is_terminal()))
}

/// Prints `label path` with the label highlighted.
pub fn print_status(label: &str, path: &Path) {
    let mut out = stdout();
    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = write!(out, "{label}");
    let _ = out.reset();
    let _ = writeln!(out, " {}", path.display());
}

/// Prints an error. With `full_report`, renders the whole diagnostic:
/// code, cause chain, source snippet and help.
pub fn print_error(error: &TestlistError, full_report: bool) {
    let mut err = stderr();

    if full_report {
        let mut rendered = String::new();
        let handler = GraphicalReportHandler::new();
        if handler.render_report(&mut rendered, error).is_ok() {
            let _ = writeln!(err, "{rendered}");
            return;
        }
    }

    let _ = err.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(err, "Error:");
    let _ = err.reset();
    let _ = write!(err, " {error}");
    let mut cause = std::error::Error::source(error);
    while let Some(inner) = cause {
        let _ = write!(err, ": {inner}");
        cause = inner.source();
    }
    let _ = writeln!(err);
}

/// Prints how many lists were written and how many problems were hit.
pub fn print_summary(summary: &BatchSummary) {
    let mut out = stdout();
    let written = summary.written();
    let failed = summary.error_count();

    let _ = writeln!(out);
    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = write!(
        out,
        "Wrote {written} test list(s) from {} config file(s)",
        summary.files.len()
    );
    if failed > 0 {
        let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
        let _ = write!(out, ", {failed} error(s)");
    }
    let _ = out.reset();
    let _ = writeln!(out);
}
