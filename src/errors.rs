//! Error handling for the test list generator.
//!
//! Every failure mode is a variant of [`TestlistError`]. The enum derives
//! `thiserror::Error` for the one-line message and `miette::Diagnostic` for
//! codes, help text and (for parse failures) a labelled source snippet.

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

pub type Result<T, E = TestlistError> = std::result::Result<T, E>;

/// Unified error type for reading, expanding and writing test suites.
#[derive(Debug, Error, Diagnostic)]
pub enum TestlistError {
    #[error("Could not find config file: {}", path.display())]
    #[diagnostic(
        code(testlist::config::not_found),
        help("check the path passed to --test-suite-config")
    )]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to read config file {}", path.display())]
    #[diagnostic(code(testlist::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(testlist::config::parse))]
    ConfigParse {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{label}")]
        span: SourceSpan,
        label: String,
    },

    #[error("Section [{section}] does not declare a type")]
    #[diagnostic(
        code(testlist::config::missing_type),
        help("add `type = \"base\"`, `type = \"single parameter perturbation\"` or `type = \"one off\"`")
    )]
    MissingSectionType { section: String },

    #[error("Section {section} has unknown type {kind}")]
    #[diagnostic(
        code(testlist::expand::unknown_type),
        help("recognised types are \"base\", \"single parameter perturbation\" and \"one off\"")
    )]
    UnknownSectionType { section: String, kind: String },

    #[error("More than one base section: [{first}] and [{second}]")]
    #[diagnostic(
        code(testlist::expand::duplicate_base),
        help("a config file may declare at most one section with `type = \"base\"`")
    )]
    DuplicateBaseSection { first: String, second: String },

    #[error("Section [{section}] perturbs a base case, but no base section was declared")]
    #[diagnostic(code(testlist::expand::missing_base))]
    MissingBaseSection { section: String },

    #[error("Section [{section}] sets {option} to '{value}', which is not a single word")]
    #[diagnostic(
        code(testlist::expand::invalid_value),
        help("machine and compiler apply to every test in the section and take exactly one value")
    )]
    InvalidSectionValue {
        section: String,
        option: String,
        value: String,
    },

    #[error("Section [{section}] has malformed test name '{name}'")]
    #[diagnostic(
        code(testlist::expand::malformed_name),
        help("one off entries must look like test.grid.compset.machine_compiler.testmods")
    )]
    MalformedTestName {
        section: String,
        name: String,
        #[source]
        source: NameError,
    },

    #[error("Test definition is missing required field '{field}'")]
    #[diagnostic(code(testlist::render::missing_field))]
    MissingField { field: String },

    #[error("Failed to write {}", path.display())]
    #[diagnostic(code(testlist::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TestlistError {
    /// Errors that stop the whole batch rather than the current file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnknownSectionType { .. })
    }

    pub(crate) fn parse_error(
        name: &str,
        source: &str,
        span: impl Into<SourceSpan>,
        message: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self::ConfigParse {
            message: message.into(),
            src: NamedSource::new(name, source.to_string()),
            span: span.into(),
            label: label.into(),
        }
    }
}

/// Why a fully-qualified test name could not be decomposed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("expected 5 '.'-separated parts, found {found}")]
    WrongPartCount { found: usize },
    #[error("'{0}' does not join machine and compiler with '_'")]
    MissingCompiler(String),
    #[error("{0} is empty")]
    EmptyComponent(&'static str),
}
