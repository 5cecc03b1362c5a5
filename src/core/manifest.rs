//! Module manifest parsing.
//!
//! Only one piece of structure is read from a manifest: the module identity
//! declared by its directive line (`module example.com/demo`). Everything else
//! in the file is ignored.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::util::config::ManifestConfig;

/// Error reading the module identity from a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no `{directive}` directive found in {}", path.display())]
    MissingDirective { path: PathBuf, directive: String },

    #[error("invalid `{directive}` directive in {}:{line}: missing module path", path.display())]
    MissingModulePath {
        path: PathBuf,
        directive: String,
        line: usize,
    },

    #[error("invalid `{directive}` directive in {}:{line}: empty module path", path.display())]
    EmptyModulePath {
        path: PathBuf,
        directive: String,
        line: usize,
    },
}

/// A directory that directly contains a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDir {
    /// Absolute path of the directory
    pub dir: PathBuf,

    /// Module identity parsed from the manifest
    pub module_path: String,

    /// Whether the companion lock file sits next to the manifest
    pub has_lock_file: bool,
}

impl ModuleDir {
    /// Read the manifest in `dir`.
    ///
    /// `regular_files` is the directory listing the caller already has; it is
    /// used to detect the lock file without another filesystem probe.
    pub fn load(
        dir: &Path,
        regular_files: &[String],
        config: &ManifestConfig,
    ) -> Result<Self, ManifestError> {
        let module_path = parse_module_path(&dir.join(&config.file), &config.directive)?;
        Ok(ModuleDir {
            dir: dir.to_path_buf(),
            module_path,
            has_lock_file: regular_files.iter().any(|f| *f == config.lock_file),
        })
    }
}

/// Read the manifest at `path` and return the module identity from the first
/// `directive` line.
pub fn parse_module_path(path: &Path, directive: &str) -> Result<String, ManifestError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_module_directive(&contents, directive, path)
}

/// Extract the module identity from manifest contents.
///
/// The directive must open a trimmed line and be followed by whitespace or the
/// end of the line. The second whitespace-separated token is the identity,
/// with one pair of enclosing double quotes stripped.
pub fn parse_module_directive(
    contents: &str,
    directive: &str,
    path: &Path,
) -> Result<String, ManifestError> {
    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        let Some(rest) = line.strip_prefix(directive) else {
            continue;
        };
        if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
            continue;
        }

        let Some(token) = rest.split_whitespace().next() else {
            return Err(ManifestError::MissingModulePath {
                path: path.to_path_buf(),
                directive: directive.to_string(),
                line: idx + 1,
            });
        };

        let module = unquote(token);
        if module.is_empty() {
            return Err(ManifestError::EmptyModulePath {
                path: path.to_path_buf(),
                directive: directive.to_string(),
                line: idx + 1,
            });
        }
        return Ok(module.to_string());
    }

    Err(ManifestError::MissingDirective {
        path: path.to_path_buf(),
        directive: directive.to_string(),
    })
}

fn unquote(token: &str) -> &str {
    token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(token)
}
