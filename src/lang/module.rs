//! The module-boundary generator.
//!
//! Emits one module rule per manifest directory whose `deps` lists every
//! library declared in the manifest's subtree (nested manifests excluded).
//! Libraries are accumulated as the walk visits descendants; the rule is built
//! when the walk reaches the manifest directory itself, which the host
//! guarantees happens after all of its descendants.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;

use crate::core::boundary::{BoundaryError, BoundaryResolver};
use crate::core::label::format_label;
use crate::core::manifest::{ManifestError, ModuleDir};
use crate::core::{AttrValue, KindInfo, LoadInfo, Rule, RuleFile};
use crate::lang::{AggregationState, GenerateArgs, GenerateResult, Language};
use crate::util::config::{Config, ManifestConfig, RuleConfig};
use crate::util::diagnostic::suggestions;
use crate::util::fs::package_path;

pub const MODULE_PATH_ATTR: &str = "module_path";
pub const MANIFEST_ATTR: &str = "go_mod";
pub const LOCK_ATTR: &str = "go_sum";
pub const DEPS_ATTR: &str = "deps";
pub const VISIBILITY_ATTR: &str = "visibility";

/// Attributes carried over from a previous module rule.
#[derive(Debug, Default)]
struct Salvaged {
    name: Option<String>,
    module_path: Option<String>,
    visibility: Option<AttrValue>,
}

/// Generator for module rules.
#[derive(Debug)]
pub struct ModuleLanguage {
    manifest: ManifestConfig,
    rule: RuleConfig,
    state: Mutex<AggregationState>,
}

impl ModuleLanguage {
    /// Create a generator using the given conventions.
    pub fn new(config: &Config) -> Self {
        ModuleLanguage {
            manifest: config.manifest.clone(),
            rule: config.rule.clone(),
            state: Mutex::new(AggregationState::new()),
        }
    }

    /// Manifest directories that received libraries but were never emitted.
    pub fn pending(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<_> = self.lock_state().pending().map(Path::to_path_buf).collect();
        dirs.sort();
        dirs
    }

    /// Visit one directory.
    ///
    /// Contributes the directory's libraries to its governing manifest and,
    /// when the directory is a manifest directory, emits its module rule.
    /// Manifest parse failures are logged and produce no rule.
    pub fn generate(&self, args: GenerateArgs<'_>) -> Result<GenerateResult, BoundaryError> {
        let GenerateArgs {
            root,
            dir,
            rel,
            regular_files,
            mut file,
            other_gen,
        } = args;

        let resolver = BoundaryResolver::new(root, self.manifest.file.as_str());
        let resolution = resolver.resolve(dir, regular_files)?;
        let Some(module_dir) = resolution.dir() else {
            tracing::debug!("no {} governs `{}`", self.manifest.file, rel);
            return Ok(GenerateResult::default());
        };

        let module_rel = package_path(resolver.root(), module_dir);
        let libraries = self.collect_libraries(file.as_deref(), other_gen, rel, &module_rel);

        let deps = {
            let mut state = self.lock_state();
            state.contribute(module_dir, libraries);
            if !resolution.is_current() {
                return Ok(GenerateResult::default());
            }
            state.take(module_dir)
        };

        let module = match ModuleDir::load(module_dir, regular_files, &self.manifest) {
            Ok(module) => module,
            Err(err) => {
                log_skipped(&err);
                return Ok(GenerateResult::default());
            }
        };

        let salvaged = match file.as_deref_mut() {
            Some(file) => self.salvage(file),
            None => Salvaged::default(),
        };

        tracing::debug!(
            "emitting `{}` for `{}` with {} deps",
            self.rule.kind,
            module_rel,
            deps.len()
        );

        let name = salvaged.name.unwrap_or_else(|| self.rule.name.clone());
        let mut rule = Rule::new(self.rule.kind.as_str(), name);
        rule.set_attr(
            MODULE_PATH_ATTR,
            salvaged.module_path.unwrap_or(module.module_path),
        );
        rule.set_attr(MANIFEST_ATTR, format!(":{}", self.manifest.file));
        if module.has_lock_file {
            rule.set_attr(LOCK_ATTR, format!(":{}", self.manifest.lock_file));
        }
        rule.set_attr(DEPS_ATTR, deps);
        if let Some(visibility) = salvaged.visibility {
            rule.set_attr(VISIBILITY_ATTR, visibility);
        }

        Ok(GenerateResult::single(rule))
    }

    /// Format references to the live library rules in this directory.
    ///
    /// Rules already marked for deletion, and rules without a literal name,
    /// do not count.
    fn collect_libraries(
        &self,
        file: Option<&RuleFile>,
        other_gen: &[Rule],
        rel: &str,
        module_rel: &str,
    ) -> Vec<String> {
        file.into_iter()
            .flat_map(RuleFile::rules)
            .chain(other_gen)
            .filter(|r| r.kind() == self.rule.library_kind && !r.is_deleted())
            .filter(|r| !r.name().is_empty())
            .map(|r| format_label(rel, r.name(), module_rel))
            .collect()
    }

    /// Mark the existing module rule deleted and keep what should survive.
    fn salvage(&self, file: &mut RuleFile) -> Salvaged {
        let Some(old) = file
            .rules_mut()
            .iter_mut()
            .find(|r| r.kind() == self.rule.kind)
        else {
            return Salvaged::default();
        };

        let salvaged = Salvaged {
            name: Some(old.name().to_string()),
            module_path: old
                .attr_string(MODULE_PATH_ATTR)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            visibility: old.attr(VISIBILITY_ATTR).cloned(),
        };
        old.delete();
        salvaged
    }

    fn lock_state(&self) -> MutexGuard<'_, AggregationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_skipped(err: &ManifestError) {
    match err {
        ManifestError::Io { source, .. } => {
            tracing::warn!("{}: {}; skipping module rule", err, source);
        }
        _ => {
            tracing::warn!("{}; skipping module rule\n{}", err, suggestions::NO_MODULE_DIRECTIVE);
        }
    }
}

impl Language for ModuleLanguage {
    fn name(&self) -> &str {
        "module"
    }

    fn kinds(&self) -> HashMap<String, KindInfo> {
        let mut kinds = HashMap::new();
        kinds.insert(
            self.rule.kind.clone(),
            KindInfo::new()
                .with_non_empty(MODULE_PATH_ATTR)
                .with_non_empty(MANIFEST_ATTR)
                .with_mergeable(DEPS_ATTR),
        );
        kinds
    }

    fn loads(&self) -> Vec<LoadInfo> {
        vec![LoadInfo::new(
            self.rule.load.clone(),
            vec![self.rule.kind.clone()],
        )]
    }

    fn generate_rules(&self, args: GenerateArgs<'_>) -> Result<GenerateResult> {
        Ok(self.generate(args)?)
    }
}
