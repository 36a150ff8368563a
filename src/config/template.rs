//! The annotated `template.cfg` written by `--write-template`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::{ConfigDocument, Section, TYPE_KEY};
use crate::errors::{Result, TestlistError};

pub const TEMPLATE_FILE_NAME: &str = "template.cfg";

const HEADER: &str = "\
# Each section describes one test suite and is written to its own test list.
#
# The `type` key selects how a section is expanded:
#   base                          : the unperturbed case the perturbation suites start from
#   single parameter perturbation : the base case, then the base perturbed once
#                                   for each value of each key
#   one off                       : fully qualified test names included as is
#
# Keys name the parts of a test: test.grid.compset.machine_compiler.testmods
# Keys in a \"one off\" section only group the names listed under them.
";

const STRING: &str = "string";
const LIST: &str = "space separated list";

/// Builds the three section archetypes the expander understands.
pub fn template_document() -> ConfigDocument {
    let mut doc = ConfigDocument::new();

    let mut base = Section::new("clm_base");
    base.set(TYPE_KEY, "\"base\"");
    for field in ["compset", "grid", "test", "testmods", "machine", "compiler"] {
        base.set(field, STRING);
    }
    doc.add_section(base);

    let mut spp = Section::new("clm_spp");
    spp.set(TYPE_KEY, "\"single parameter perturbation\"");
    for field in ["compset", "grid", "test", "testmods"] {
        spp.set(field, LIST);
    }
    spp.set("machine", STRING);
    spp.set("compiler", STRING);
    doc.add_section(spp);

    let mut one_off = Section::new("clm_long");
    one_off.set(TYPE_KEY, "\"one off\"");
    one_off.set("tests", LIST);
    doc.add_section(one_off);

    doc
}

/// The full text of `template.cfg`.
pub fn template_text() -> String {
    format!("{HEADER}\n{}", template_document())
}

/// Writes `template.cfg` into `dir` and returns its path.
pub fn write_template(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(TEMPLATE_FILE_NAME);
    fs::write(&path, template_text()).map_err(|source| TestlistError::Write {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "wrote template config");
    Ok(path)
}
