//! Reading test suite configuration documents.
//!
//! A configuration document is an INI-style file: `[section]` headers
//! followed by `key = value` (or `key: value`) entries. Sections and the
//! options inside them keep their declaration order. Option names are
//! case-insensitive and stored lower-cased. A `[DEFAULT]` section is not a
//! suite of its own; its options are inherited by every other section.

use std::{fmt, fs, path::Path};

use pest::{error::Error, iterators::Pair, Parser};
use pest_derive::Parser;
use tracing::debug;

use crate::errors::{Result, TestlistError};

pub mod template;

#[derive(Parser)]
#[grammar = "config/grammar.pest"]
struct ConfigParser;

/// Section whose options every other section inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Option naming the kind of suite a section describes.
pub const TYPE_KEY: &str = "type";

// ============================================================================
// DOCUMENT MODEL
// ============================================================================

/// One `[name]` block and its ordered options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    options: Vec<(String, String)>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Option names in declaration order.
    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|(k, _)| k.as_str())
    }

    /// `(name, raw value)` pairs in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, option: &str) -> Option<&str> {
        let option = option.to_lowercase();
        self.options
            .iter()
            .find(|(k, _)| *k == option)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, option: &str) -> bool {
        self.get(option).is_some()
    }

    /// Sets an option, replacing its value in place if it already exists.
    pub fn set(&mut self, option: impl Into<String>, value: impl Into<String>) {
        let option = option.into().to_lowercase();
        let value = value.into();
        match self.options.iter_mut().find(|(k, _)| *k == option) {
            Some(entry) => entry.1 = value,
            None => self.options.push((option, value)),
        }
    }

    pub fn remove(&mut self, option: &str) -> Option<String> {
        let option = option.to_lowercase();
        let index = self.options.iter().position(|(k, _)| *k == option)?;
        Some(self.options.remove(index).1)
    }

    /// The `type` value with surrounding quote characters stripped.
    pub fn section_type(&self) -> Option<&str> {
        self.get(TYPE_KEY)
            .map(|raw| raw.trim().trim_matches(|c: char| c == '"' || c == '\''))
    }
}

/// A parsed configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    sections: Vec<Section>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(Section::name)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Appends a section, replacing any existing section of the same name.
    pub fn add_section(&mut self, section: Section) {
        match self.sections.iter_mut().find(|s| s.name == section.name) {
            Some(existing) => *existing = section,
            None => self.sections.push(section),
        }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in section.entries() {
                writeln!(f, "{} = {}", key, value.replace('\n', "\n\t"))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Reads and parses the configuration file at `path`.
pub fn read(path: &Path) -> Result<ConfigDocument> {
    if !path.is_file() {
        return Err(TestlistError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let source = fs::read_to_string(path).map_err(|source| TestlistError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = source.len(), "read config file");
    parse(&path.display().to_string(), &source)
}

/// Parses configuration text. `name` identifies the source in diagnostics.
pub fn parse(name: &str, source: &str) -> Result<ConfigDocument> {
    let mut pairs = ConfigParser::parse(Rule::document, source)
        .map_err(|e| convert_parse_error(e, name, source))?;
    let Some(document) = pairs.next() else {
        return Ok(ConfigDocument::new());
    };

    let mut doc = ConfigDocument::new();
    let mut defaults: Option<Section> = None;

    for pair in document.into_inner() {
        if pair.as_rule() != Rule::section {
            continue;
        }
        let (section, header) = build_section(pair, name, source)?;
        let seen = if section.name == DEFAULT_SECTION {
            defaults.is_some()
        } else {
            doc.section(&section.name).is_some()
        };
        if seen {
            return Err(TestlistError::parse_error(
                name,
                source,
                header,
                format!("While reading {name}: section '{}' already exists", section.name),
                "duplicate section",
            ));
        }
        if section.name == DEFAULT_SECTION {
            defaults = Some(section);
        } else {
            doc.sections.push(section);
        }
    }

    if let Some(defaults) = defaults {
        for section in &mut doc.sections {
            for (key, value) in defaults.entries() {
                if !section.contains(key) {
                    section.options.push((key.to_string(), value.to_string()));
                }
            }
        }
    }

    debug!(source = name, sections = doc.len(), "parsed config document");
    Ok(doc)
}

// ============================================================================
// DOCUMENT BUILDERS
// ============================================================================

type ByteSpan = (usize, usize);

fn byte_span(pair: &Pair<Rule>) -> ByteSpan {
    let span = pair.as_span();
    (span.start(), span.end() - span.start())
}

/// Builds a section and returns it with the span of its header.
fn build_section(pair: Pair<Rule>, name: &str, source: &str) -> Result<(Section, ByteSpan)> {
    let mut section = Section::default();
    let mut header = (0, 0);

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::header => {
                header = byte_span(&item);
                section.name = item
                    .into_inner()
                    .next()
                    .map(|n| n.as_str().trim().to_string())
                    .unwrap_or_default();
            }
            Rule::entry => {
                let span = byte_span(&item);
                let (key, value) = build_entry(item);
                if section.contains(&key) {
                    return Err(TestlistError::parse_error(
                        name,
                        source,
                        span,
                        format!(
                            "While reading {name}: option '{key}' in section '{}' already exists",
                            section.name
                        ),
                        "duplicate option",
                    ));
                }
                section.options.push((key, value));
            }
            _ => {}
        }
    }
    Ok((section, header))
}

fn build_entry(pair: Pair<Rule>) -> (String, String) {
    let mut key = String::new();
    let mut value = String::new();

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::key => key = part.as_str().trim().to_lowercase(),
            Rule::value => value = part.as_str().trim().to_string(),
            Rule::continuation => {
                for line in part.into_inner() {
                    match line.as_rule() {
                        Rule::gap => {
                            let blanks = line.as_str().matches('\n').count();
                            value.push_str(&"\n".repeat(blanks));
                        }
                        Rule::continued => {
                            value.push('\n');
                            value.push_str(line.as_str().trim());
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    (key, value)
}

fn convert_parse_error(error: Error<Rule>, name: &str, source: &str) -> TestlistError {
    let error = error.renamed_rules(|rule| match rule {
        Rule::section | Rule::header => "section header `[name]`".to_string(),
        Rule::entry | Rule::key => "`key = value` entry".to_string(),
        Rule::section_name => "section name".to_string(),
        Rule::EOI => "end of file".to_string(),
        other => format!("{other:?}"),
    });

    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => (pos, 0),
        pest::error::InputLocation::Span((start, end)) => (start, end - start),
    };
    let (line, col) = match error.line_col {
        pest::error::LineColLocation::Pos(at) => at,
        pest::error::LineColLocation::Span(at, _) => at,
    };
    let detail = error.variant.message().to_string();

    TestlistError::parse_error(
        name,
        source,
        span,
        format!("File contains parsing errors: {name} (line {line}, column {col}): {detail}"),
        detail,
    )
}
