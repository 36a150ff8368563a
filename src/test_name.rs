//! Test definitions and the test-name template.
//!
//! A [`TestDefinition`] is a field mapping (`test`, `grid`, `compset`,
//! `machine`, `compiler`, `testmods`) that renders into a fully-qualified
//! test name of the form `test.grid.compset.machine_compiler.testmods`.
//! [`TestDefinition::from_test_name`] is the inverse, used for one off
//! entries that spell out the whole name.

use std::fmt;

use im::OrdMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{NameError, Result, TestlistError};

/// Pattern every test name is rendered with.
pub const TEST_NAME_TEMPLATE: &str = "${test}.${grid}.${compset}.${machine}_${compiler}.${testmods}";

/// The fields a complete test definition binds.
pub const FIELDS: [&str; 6] = ["test", "grid", "compset", "machine", "compiler", "testmods"];

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid"));

static TEST_NAME: Lazy<Template> = Lazy::new(|| Template::new(TEST_NAME_TEMPLATE));

// ============================================================================
// TEST DEFINITION
// ============================================================================

/// A field mapping describing one test case.
///
/// Backed by a persistent map, so cloning is cheap and every clone is an
/// independent value: overwriting a field on a copy of the base definition
/// never touches the base.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestDefinition {
    fields: OrdMap<String, String>,
}

impl TestDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns a copy with `field` overwritten.
    pub fn with(&self, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            fields: self.fields.update(field.into(), value.into()),
        }
    }

    /// Decomposes `test.grid.compset.machine_compiler.testmods`.
    ///
    /// Exactly five non-empty `.`-separated parts are required. The fourth
    /// part is split at its last `_`, so machine names may contain
    /// underscores but compiler names may not.
    pub fn from_test_name(name: &str) -> Result<Self, NameError> {
        let parts: Vec<&str> = name.split('.').collect();
        let &[test, grid, compset, machine_compiler, testmods] = parts.as_slice() else {
            return Err(NameError::WrongPartCount { found: parts.len() });
        };
        let (machine, compiler) = machine_compiler
            .rsplit_once('_')
            .ok_or_else(|| NameError::MissingCompiler(machine_compiler.to_string()))?;

        let mut def = Self::new();
        for (field, value) in FIELDS
            .into_iter()
            .zip([test, grid, compset, machine, compiler, testmods])
        {
            if value.is_empty() {
                return Err(NameError::EmptyComponent(field));
            }
            def.set(field, value);
        }
        Ok(def)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TestDefinition {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// TEMPLATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A `${name}` substitution template, parsed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn new(pattern: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(pattern) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(pattern[last..whole.start()].to_string()));
            }
            segments.push(Segment::Field(name.as_str().to_string()));
            last = whole.end();
        }
        if last < pattern.len() {
            segments.push(Segment::Literal(pattern[last..].to_string()));
        }
        Self { segments }
    }

    /// Placeholder names in the order they appear.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitutes every placeholder. A field that is absent or empty is an
    /// error; nothing unresolved ever reaches the output.
    pub fn render(&self, def: &TestDefinition) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => match def.get(name) {
                    Some(value) if !value.is_empty() => out.push_str(value),
                    _ => return Err(TestlistError::MissingField { field: name.clone() }),
                },
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(text)?,
                Segment::Field(name) => write!(f, "${{{name}}}")?,
            }
        }
        Ok(())
    }
}

/// Renders `def` with [`TEST_NAME_TEMPLATE`].
pub fn render(def: &TestDefinition) -> Result<String> {
    TEST_NAME.render(def)
}
