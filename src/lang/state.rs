//! Cross-directory accumulation of library references.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Library references collected per governing manifest directory.
///
/// Entries are created on first contribution and only ever grow until
/// [`take`](Self::take) drains them at emission time.
#[derive(Debug, Default)]
pub struct AggregationState {
    targets: HashMap<PathBuf, Vec<String>>,
}

impl AggregationState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append references to the entry for `module_dir`.
    pub fn contribute(&mut self, module_dir: &Path, labels: impl IntoIterator<Item = String>) {
        let mut labels = labels.into_iter().peekable();
        if labels.peek().is_none() {
            return;
        }
        self.targets
            .entry(module_dir.to_path_buf())
            .or_default()
            .extend(labels);
    }

    /// Drain the entry for `module_dir`, sorted and deduplicated.
    pub fn take(&mut self, module_dir: &Path) -> Vec<String> {
        let mut labels = self.targets.remove(module_dir).unwrap_or_default();
        labels.sort();
        labels.dedup();
        labels
    }

    /// Directories that received references but were never drained.
    pub fn pending(&self) -> impl Iterator<Item = &Path> {
        self.targets.keys().map(PathBuf::as_path)
    }

    /// Check whether nothing is waiting to be emitted.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
