//! Writing rendered test lists to disk.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use tracing::debug;

use crate::errors::{Result, TestlistError};
use crate::test_name::{render, TestDefinition};

/// Suffix of every generated test list file.
pub const TESTLIST_SUFFIX: &str = "testlist.txt";

/// Renders `tests` one name per line, each line newline-terminated.
pub fn render_testlist(tests: &[TestDefinition]) -> Result<String> {
    let mut out = String::new();
    for test in tests {
        out.push_str(&render(test)?);
        out.push('\n');
    }
    Ok(out)
}

/// Writes `tests` to `path`, truncating any existing file.
///
/// Lines are rendered and written in order. A render failure stops the
/// write and may leave the lines written so far on disk; the file handle is
/// closed on every path.
pub fn write_testlist(path: &Path, tests: &[TestDefinition]) -> Result<()> {
    let io_err = |source| TestlistError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    for test in tests {
        let name = render(test)?;
        writeln!(out, "{name}").map_err(io_err)?;
    }
    out.flush().map_err(io_err)?;

    debug!(path = %path.display(), tests = tests.len(), "wrote test list");
    Ok(())
}
