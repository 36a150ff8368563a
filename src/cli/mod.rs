//! The test list generator command-line interface.
//!
//! Orchestrates reading each config file, expanding its suites and writing
//! one test list per suite. A failure in one config file is reported and the
//! batch moves on to the next file; only errors that mark the run itself as
//! broken stop the batch.

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::args::TestlistArgs;
use crate::config::{self, template::write_template};
use crate::errors::{Result, TestlistError};
use crate::expand::SuiteExpander;
use crate::writer::{write_testlist, TESTLIST_SUFFIX};

pub mod args;
pub mod output;

// ============================================================================
// REPORTS
// ============================================================================

/// Outcome of processing one config file.
#[derive(Debug)]
pub struct FileReport {
    pub config: PathBuf,
    pub written: Vec<PathBuf>,
    pub errors: Vec<TestlistError>,
}

impl FileReport {
    fn new(config: &Path) -> Self {
        Self {
            config: config.to_path_buf(),
            written: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Outcome of a whole run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub files: Vec<FileReport>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.files.iter().all(FileReport::is_success)
    }

    pub fn written(&self) -> usize {
        self.files.iter().map(|f| f.written.len()).sum()
    }

    pub fn error_count(&self) -> usize {
        self.files.iter().map(|f| f.errors.len()).sum()
    }
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() -> ExitCode {
    let args = TestlistArgs::parse();
    init_logging(args.debug);
    debug!(?args, "parsed arguments");

    match execute(&args) {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            output::print_error(&e, args.backtrace);
            ExitCode::FAILURE
        }
    }
}

/// Runs the requested mode. Errors returned here abort the whole run;
/// per-file failures are printed and recorded in the summary instead.
pub fn execute(args: &TestlistArgs) -> Result<BatchSummary> {
    if args.write_template {
        let path = write_template(Path::new("."))?;
        output::print_status("Wrote template configuration to:", &path);
        return Ok(BatchSummary::default());
    }

    let mut summary = BatchSummary::default();
    for path in &args.test_suite_config {
        let report = process_config(path)?;
        for error in &report.errors {
            output::print_error(error, args.backtrace);
        }
        summary.files.push(report);
    }

    if summary.files.len() > 1 || !summary.is_success() {
        output::print_summary(&summary);
    }
    Ok(summary)
}

/// Reads, expands and writes one config file.
///
/// Returns `Err` only for fatal errors. A missing or unparsable file, or a
/// document with more than one base, is recorded in the report; a bad
/// section skips only that section's list.
pub fn process_config(path: &Path) -> Result<FileReport> {
    let mut report = FileReport::new(path);
    output::print_status("Reading configuration file :", path);

    let expander = match config::read(path).and_then(|doc| SuiteExpander::new(&doc)) {
        Ok(expander) => expander,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            report.errors.push(e);
            return Ok(report);
        }
    };

    let stem = output_stem(path);
    let dir = path.parent().unwrap_or_else(|| Path::new(""));

    for suite in expander.suites() {
        let expanded = match expander.expand_suite(suite) {
            Ok(expanded) => expanded,
            Err(e) => {
                report.errors.push(e);
                continue;
            }
        };

        let out_path = testlist_path(dir, &stem, &expanded.name);
        output::print_status("Writing test list to:", &out_path);
        match write_testlist(&out_path, &expanded.tests) {
            Ok(()) => report.written.push(out_path),
            Err(e) => report.errors.push(e),
        }
    }

    info!(
        config = %path.display(),
        written = report.written.len(),
        errors = report.errors.len(),
        "processed config file"
    );
    Ok(report)
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// The config file name truncated at its first `.`.
pub fn output_stem(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.split('.').next().map(str::to_string))
        .unwrap_or_default()
}

/// `<dir>/<stem>.<section>.testlist.txt`
pub fn testlist_path(dir: &Path, stem: &str, section: &str) -> PathBuf {
    dir.join(format!("{stem}.{section}.{TESTLIST_SUFFIX}"))
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
