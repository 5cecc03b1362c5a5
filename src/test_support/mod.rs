//! Test utilities for modbound unit tests.
//!
//! `TreeFixture` lays out a throwaway source tree on disk and offers a small
//! host emulation (`visit`) that feeds directories to a `Language` the way
//! the walker does.

pub mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::{Rule, RuleFile};
use crate::lang::{GenerateArgs, GenerateResult, Language};
use crate::util::fs::{normalize_path, regular_files};

pub use fixtures::*;

/// A temporary source tree.
pub struct TreeFixture {
    tmp: TempDir,
}

impl TreeFixture {
    /// Create an empty tree.
    pub fn new() -> Self {
        TreeFixture {
            tmp: TempDir::new().unwrap(),
        }
    }

    /// Get the tree root.
    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// Get the absolute path of a root-relative directory.
    pub fn dir(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.root().to_path_buf()
        } else {
            self.root().join(rel)
        }
    }

    /// Create a directory (and its parents).
    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let dir = self.dir(rel);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write a file relative to the root.
    pub fn file(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    /// Write a `go.mod` declaring `module` in directory `rel`.
    pub fn manifest(&self, rel: &str, module: &str) -> PathBuf {
        self.mkdir(rel);
        self.file(&join(rel, "go.mod"), &go_mod(module))
    }

    /// Write a `BUILD.bazel` in directory `rel`.
    pub fn build(&self, rel: &str, contents: &str) -> PathBuf {
        self.mkdir(rel);
        self.file(&join(rel, "BUILD.bazel"), contents)
    }

    /// Run `lang` for directory `rel`, as the walker would, with the given
    /// existing file and rules from earlier generators.
    pub fn visit(
        &self,
        lang: &dyn Language,
        rel: &str,
        file: Option<&mut RuleFile>,
        other_gen: &[Rule],
    ) -> anyhow::Result<GenerateResult> {
        let root = normalize_path(self.root());
        let dir = self.mkdir(rel);
        let files = regular_files(&dir).unwrap();
        lang.generate_rules(GenerateArgs {
            root: &root,
            dir: &dir,
            rel,
            regular_files: &files,
            file,
            other_gen,
        })
    }
}

impl Default for TreeFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn join(rel: &str, name: &str) -> String {
    if rel.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", rel, name)
    }
}
