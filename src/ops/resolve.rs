//! Implementation of `modbound resolve`.

use std::path::Path;

use anyhow::{bail, Result};

use crate::core::{BoundaryResolver, Resolution};
use crate::util::fs::regular_files;
use crate::util::Config;

/// Find the manifest directory that governs `dir` within `root`.
pub fn resolve_boundary(config: &Config, root: &Path, dir: &Path) -> Result<Resolution> {
    if !dir.is_dir() {
        bail!("not a directory: {}", dir.display());
    }
    let files = regular_files(dir)?;
    let resolver = BoundaryResolver::new(root, config.manifest.file.as_str());
    Ok(resolver.resolve(dir, &files)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BoundaryError;
    use crate::test_support::TreeFixture;
    use crate::util::fs::normalize_path;

    #[test]
    fn test_resolve_current_and_ancestor() {
        let tree = TreeFixture::new();
        tree.manifest("mod", "example.com/mod");
        tree.mkdir("mod/pkg");
        let config = Config::default();

        let current = resolve_boundary(&config, tree.root(), &tree.dir("mod")).unwrap();
        assert!(current.is_current());

        let ancestor = resolve_boundary(&config, tree.root(), &tree.dir("mod/pkg")).unwrap();
        assert_eq!(ancestor, Resolution::Ancestor(normalize_path(&tree.dir("mod"))));
    }

    #[test]
    fn test_resolve_outside_root() {
        let tree = TreeFixture::new();
        tree.mkdir("root");
        tree.mkdir("other");

        let err =
            resolve_boundary(&Config::default(), &tree.dir("root"), &tree.dir("other")).unwrap_err();
        assert!(err.downcast_ref::<BoundaryError>().is_some());
    }

    #[test]
    fn test_resolve_missing_dir() {
        let tree = TreeFixture::new();
        assert!(resolve_boundary(&Config::default(), tree.root(), &tree.dir("nope")).is_err());
    }
}
