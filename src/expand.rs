//! Suite expansion: turning declarative sections into test definitions.
//!
//! Three section types are understood:
//!
//! - `base`: the unperturbed case. Every option is a literal field of the
//!   base definition. At most one per document, never written itself.
//! - `single parameter perturbation`: the base case followed by one copy of
//!   the base per value of each option, with that one field overwritten.
//!   `machine` and `compiler` are section-wide settings, not perturbations.
//! - `one off`: every value is a fully-qualified test name taken as is.

use std::fmt;

use tracing::debug;

use crate::config::{ConfigDocument, Section, TYPE_KEY};
use crate::errors::{Result, TestlistError};
use crate::test_name::TestDefinition;

/// Options of a perturbation section that apply to every entry.
pub const SECTION_WIDE_FIELDS: [&str; 2] = ["machine", "compiler"];

/// Machine and compiler used when neither the base nor the section sets one.
pub const DEFAULT_PLATFORM: &str = "any";

pub type TestList = Vec<TestDefinition>;

// ============================================================================
// SECTION KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Base,
    SingleParameterPerturbation,
    OneOff,
}

impl SectionKind {
    /// Maps a quote-stripped `type` value to a kind.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "base" => Some(Self::Base),
            "single parameter perturbation" => Some(Self::SingleParameterPerturbation),
            "one off" => Some(Self::OneOff),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::SingleParameterPerturbation => "single parameter perturbation",
            Self::OneOff => "one off",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a non-base section turns into tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expansion {
    Perturbation,
    OneOff,
}

/// A non-base section waiting to be expanded, with its `type` removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    pub section: Section,
    expansion: Expansion,
}

impl Suite {
    pub fn name(&self) -> &str {
        self.section.name()
    }

    pub fn kind(&self) -> SectionKind {
        match self.expansion {
            Expansion::Perturbation => SectionKind::SingleParameterPerturbation,
            Expansion::OneOff => SectionKind::OneOff,
        }
    }
}

/// The test definitions produced for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedSection {
    pub name: String,
    pub kind: SectionKind,
    pub tests: TestList,
}

// ============================================================================
// EXPANDER
// ============================================================================

/// Holds the base definition and the sections left to expand.
///
/// Construction validates the whole document: every section must declare a
/// recognised type and at most one may be `base`. Expansion never mutates
/// the expander, so expanding twice yields identical lists.
#[derive(Debug, Clone)]
pub struct SuiteExpander {
    base: Option<TestDefinition>,
    suites: Vec<Suite>,
}

impl SuiteExpander {
    pub fn new(doc: &ConfigDocument) -> Result<Self> {
        let mut base: Option<(String, TestDefinition)> = None;
        let mut suites = Vec::new();

        for section in doc.sections() {
            let Some(raw) = section.section_type() else {
                return Err(TestlistError::MissingSectionType {
                    section: section.name().to_string(),
                });
            };
            let expansion = match SectionKind::parse(raw) {
                Some(SectionKind::Base) => {
                    if let Some((first, _)) = &base {
                        return Err(TestlistError::DuplicateBaseSection {
                            first: first.clone(),
                            second: section.name().to_string(),
                        });
                    }
                    debug!(section = section.name(), "found base section");
                    base = Some((section.name().to_string(), base_definition(section.clone())));
                    continue;
                }
                Some(SectionKind::SingleParameterPerturbation) => Expansion::Perturbation,
                Some(SectionKind::OneOff) => Expansion::OneOff,
                None => {
                    return Err(TestlistError::UnknownSectionType {
                        section: section.name().to_string(),
                        kind: raw.to_string(),
                    })
                }
            };
            let mut section = section.clone();
            section.remove(TYPE_KEY);
            suites.push(Suite { section, expansion });
        }

        Ok(Self {
            base: base.map(|(_, def)| def),
            suites,
        })
    }

    pub fn base(&self) -> Option<&TestDefinition> {
        self.base.as_ref()
    }

    /// Non-base sections in document order.
    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }

    pub fn expand_suite(&self, suite: &Suite) -> Result<ExpandedSection> {
        let tests = match suite.expansion {
            Expansion::Perturbation => self.expand_perturbations(&suite.section)?,
            Expansion::OneOff => expand_one_offs(&suite.section)?,
        };
        debug!(
            section = suite.name(),
            kind = %suite.kind(),
            tests = tests.len(),
            "expanded section"
        );
        Ok(ExpandedSection {
            name: suite.name().to_string(),
            kind: suite.kind(),
            tests,
        })
    }

    /// Expands every suite, stopping at the first failure.
    pub fn expand_all(&self) -> Result<Vec<ExpandedSection>> {
        self.suites.iter().map(|s| self.expand_suite(s)).collect()
    }

    fn expand_perturbations(&self, section: &Section) -> Result<TestList> {
        let base = self
            .base
            .as_ref()
            .ok_or_else(|| TestlistError::MissingBaseSection {
                section: section.name().to_string(),
            })?;

        let mut seed = base.clone();
        for field in SECTION_WIDE_FIELDS {
            match section.get(field) {
                Some(value) => seed.set(field, single_word(section, field, value)?),
                None if !seed.contains(field) => seed.set(field, DEFAULT_PLATFORM),
                None => {}
            }
        }

        let mut tests = vec![seed.clone()];
        for (option, value) in section.entries() {
            if SECTION_WIDE_FIELDS.contains(&option) {
                continue;
            }
            tests.extend(value.split_whitespace().map(|item| seed.with(option, item)));
        }
        Ok(tests)
    }
}

/// Expands every section of `doc` keyed by section name, in document order.
pub fn expand(doc: &ConfigDocument) -> Result<Vec<ExpandedSection>> {
    SuiteExpander::new(doc)?.expand_all()
}

// ============================================================================
// HELPERS
// ============================================================================

fn base_definition(mut section: Section) -> TestDefinition {
    section.remove(TYPE_KEY);
    section
        .entries()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A section-wide setting lands inside every rendered name, so it must be
/// exactly one whitespace-free token.
fn single_word<'a>(section: &Section, option: &str, value: &'a str) -> Result<&'a str> {
    let mut words = value.split_whitespace();
    match (words.next(), words.next()) {
        (Some(word), None) => Ok(word),
        _ => Err(TestlistError::InvalidSectionValue {
            section: section.name().to_string(),
            option: option.to_string(),
            value: value.to_string(),
        }),
    }
}

fn expand_one_offs(section: &Section) -> Result<TestList> {
    let mut tests = Vec::new();
    for (_group, value) in section.entries() {
        for name in value.split_whitespace() {
            let def = TestDefinition::from_test_name(name).map_err(|source| {
                TestlistError::MalformedTestName {
                    section: section.name().to_string(),
                    name: name.to_string(),
                    source,
                }
            })?;
            tests.push(def);
        }
    }
    Ok(tests)
}
