//! Module boundary resolution.
//!
//! For any directory in the walked tree, the governing manifest is the nearest
//! manifest found by walking upward, stopping at (and including) the root.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::{is_inside, normalize_path};

/// Error resolving the boundary for a directory.
#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("directory {} is outside the root {}", dir.display(), root.display())]
    OutsideRoot { dir: PathBuf, root: PathBuf },
}

impl BoundaryError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BoundaryError::OutsideRoot { dir, root } => Diagnostic::error(format!(
                "`{}` is not inside the configured root",
                dir.display()
            ))
            .with_location(dir.clone())
            .with_context(format!("root: {}", root.display()))
            .with_suggestion(suggestions::OUTSIDE_ROOT)
            .with_suggestion("Run the command from inside the source tree"),
        }
    }
}

/// The governing manifest directory for a visited directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The visited directory holds the manifest itself.
    Current(PathBuf),

    /// The nearest ancestor (up to and including the root) holding a manifest.
    Ancestor(PathBuf),

    /// No manifest between the directory and the root.
    NotFound,
}

impl Resolution {
    /// The governing directory, if any.
    pub fn dir(&self) -> Option<&Path> {
        match self {
            Resolution::Current(dir) | Resolution::Ancestor(dir) => Some(dir),
            Resolution::NotFound => None,
        }
    }

    /// Check whether the visited directory is itself the manifest directory.
    pub fn is_current(&self) -> bool {
        matches!(self, Resolution::Current(_))
    }
}

/// Finds the governing manifest directory for directories under a root.
#[derive(Debug, Clone)]
pub struct BoundaryResolver {
    root: PathBuf,
    manifest_file: String,
}

impl BoundaryResolver {
    /// Create a resolver bounded by `root`.
    pub fn new(root: &Path, manifest_file: impl Into<String>) -> Self {
        BoundaryResolver {
            root: normalize_path(root),
            manifest_file: manifest_file.into(),
        }
    }

    /// Get the normalized root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the governing manifest directory for `dir`.
    ///
    /// `regular_files` is the listing of `dir` supplied by the walker; it
    /// answers for `dir` itself. Ancestors are probed on disk.
    pub fn resolve(&self, dir: &Path, regular_files: &[String]) -> Result<Resolution, BoundaryError> {
        let dir = normalize_path(dir);
        if !is_inside(&dir, &self.root) {
            return Err(BoundaryError::OutsideRoot {
                dir,
                root: self.root.clone(),
            });
        }

        if regular_files.iter().any(|f| *f == self.manifest_file) {
            return Ok(Resolution::Current(dir));
        }

        let mut current = dir.as_path();
        while current != self.root {
            let Some(parent) = current.parent() else {
                break;
            };
            if parent.join(&self.manifest_file).is_file() {
                return Ok(Resolution::Ancestor(parent.to_path_buf()));
            }
            current = parent;
        }

        Ok(Resolution::NotFound)
    }
}
