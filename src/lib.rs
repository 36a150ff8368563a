pub use crate::errors::{NameError, Result, TestlistError};
pub use crate::expand::{expand, ExpandedSection, SectionKind, SuiteExpander};
pub use crate::test_name::{render, Template, TestDefinition};

pub mod cli;
pub mod config;
pub mod errors;
pub mod expand;
pub mod test_name;
pub mod writer;
