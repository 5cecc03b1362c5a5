//! Reading and writing build files.

pub mod parser;
pub mod writer;

use std::path::{Path, PathBuf};

use anyhow::Result;
use miette::{GraphicalReportHandler, GraphicalTheme};

use crate::core::RuleFile;
use crate::util::fs::{read_to_string, write_string};

pub use parser::{parse, BuildFileError};
pub use writer::format;

/// Find the build file in `dir`, trying `names` in order.
pub fn find_build_file(dir: &Path, names: &[String]) -> Option<PathBuf> {
    names
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Load and parse a build file.
pub fn load(path: &Path) -> Result<RuleFile> {
    let contents = read_to_string(path)?;
    Ok(parse(&contents, path)?)
}

/// Render a syntax error with a snippet of the offending source.
pub fn render_error(err: &BuildFileError) -> String {
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    let mut out = String::new();
    match handler.render_report(&mut out, err) {
        Ok(()) => out,
        Err(_) => err.to_string(),
    }
}

/// Write `file` to its path if the canonical text differs from what is on
/// disk. Returns whether the file changed.
pub fn save_if_changed(file: &RuleFile, dry_run: bool) -> Result<bool> {
    let text = format(file);
    let current = std::fs::read_to_string(file.path()).ok();
    if current.as_deref() == Some(text.as_str()) {
        return Ok(false);
    }
    if !dry_run {
        write_string(file.path(), &text)?;
    }
    Ok(true)
}
