//! Command-line flags.
//!
//! Either `--write-template` or `--test-suite-config` must be given. When
//! both are, the template is written and the configs are ignored.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "testlist",
    version,
    about = "Generate simulation test lists from declarative test suite configs."
)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .multiple(true)
        .args(["test_suite_config", "write_template"])
))]
pub struct TestlistArgs {
    /// Show the full error report, including its cause chain, on failure.
    #[arg(long)]
    pub backtrace: bool,

    /// Extra debugging output.
    #[arg(long)]
    pub debug: bool,

    /// Name of config file(s) defining a test suite.
    #[arg(long, num_args = 1.., value_name = "PATH")]
    pub test_suite_config: Vec<PathBuf>,

    /// Write a template input configuration file and exit.
    #[arg(long)]
    pub write_template: bool,
}
