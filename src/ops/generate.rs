//! Implementation of `modbound generate`.
//!
//! Walks the source tree children-first and runs every generator once per
//! directory, merging what they produce into that directory's build file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glob::Pattern;
use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use crate::build_file::{self, find_build_file, BuildFileError};
use crate::core::{KindInfo, LoadInfo, Rule, RuleFile};
use crate::lang::module::{DEPS_ATTR, MODULE_PATH_ATTR};
use crate::lang::{GenerateArgs, Language, ModuleLanguage};
use crate::util::fs::{normalize_path, package_path, regular_files};
use crate::util::Config;

/// Options for the generate command.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Root of the tree to walk
    pub root: PathBuf,

    /// Compute changes without writing files
    pub dry_run: bool,
}

/// A rule produced during the walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedRule {
    /// Package the rule was emitted into (`""` for the root)
    pub package: String,
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_path: Option<String>,
    pub deps: Vec<String>,
}

impl EmittedRule {
    fn new(package: &str, rule: &Rule) -> Self {
        EmittedRule {
            package: package.to_string(),
            kind: rule.kind().to_string(),
            name: rule.name().to_string(),
            module_path: rule.attr_string(MODULE_PATH_ATTR).map(str::to_string),
            deps: rule
                .attr_strings(DEPS_ATTR)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
        }
    }
}

/// A build file that could not be parsed and was left as it was.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,

    /// One-line error (`file:line:column: message`)
    pub message: String,

    /// Error rendered with a source snippet
    #[serde(skip)]
    pub rendered: String,
}

impl SkippedFile {
    fn new(path: &Path, err: &BuildFileError) -> Self {
        SkippedFile {
            path: path.to_path_buf(),
            message: err.to_string(),
            rendered: build_file::render_error(err),
        }
    }
}

/// Summary of a generate run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateReport {
    /// Normalized root that was walked
    pub root: PathBuf,

    /// Number of directories visited
    pub directories: usize,

    /// Build files that were (or, in a dry run, would be) written
    pub written: Vec<PathBuf>,

    /// Rules emitted, in walk order
    pub emitted: Vec<EmittedRule>,

    /// Build files left untouched because they could not be parsed
    pub skipped: Vec<SkippedFile>,
}

/// Run the walk with the built-in module generator.
pub fn generate(config: &Config, opts: &GenerateOptions) -> Result<GenerateReport> {
    let module = ModuleLanguage::new(config);
    let report = generate_with(config, opts, &[&module])?;

    for dir in module.pending() {
        tracing::debug!(
            "libraries reached {} after its rule was emitted",
            dir.display()
        );
    }

    Ok(report)
}

/// Run the walk with a custom chain of generators.
///
/// Each generator sees the rules produced by the ones before it as
/// `other_gen`.
pub fn generate_with(
    config: &Config,
    opts: &GenerateOptions,
    languages: &[&dyn Language],
) -> Result<GenerateReport> {
    let root = normalize_path(&opts.root);
    if !root.is_dir() {
        bail!("root is not a directory: {}", root.display());
    }

    let excludes = config
        .walk
        .exclude
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("invalid exclude pattern: {}", p)))
        .collect::<Result<Vec<_>>>()?;

    let mut kinds = HashMap::new();
    let mut loads = Vec::new();
    for lang in languages {
        kinds.extend(lang.kinds());
        loads.extend(lang.loads());
    }

    let mut generator = Generator {
        config,
        root: root.clone(),
        languages,
        kinds,
        loads,
        dry_run: opts.dry_run,
        report: GenerateReport {
            root: root.clone(),
            ..GenerateReport::default()
        },
    };

    let walker = WalkDir::new(&root)
        .contents_first(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry, &root, &excludes));

    for entry in walker {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.file_type().is_dir() {
            generator.visit(entry.path())?;
        }
    }

    tracing::debug!(
        "visited {} directories, {} files changed",
        generator.report.directories,
        generator.report.written.len()
    );

    Ok(generator.report)
}

fn is_skipped(entry: &DirEntry, root: &Path, excludes: &[Pattern]) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    if entry.file_name().to_string_lossy().starts_with('.') {
        return true;
    }
    let rel = package_path(root, entry.path());
    excludes.iter().any(|p| p.matches(&rel))
}

struct Generator<'a> {
    config: &'a Config,
    root: PathBuf,
    languages: &'a [&'a dyn Language],
    kinds: HashMap<String, KindInfo>,
    loads: Vec<LoadInfo>,
    dry_run: bool,
    report: GenerateReport,
}

impl Generator<'_> {
    fn visit(&mut self, dir: &Path) -> Result<()> {
        let rel = package_path(&self.root, dir);
        let files = regular_files(dir)?;
        tracing::debug!("visiting //{}", rel);
        self.report.directories += 1;

        let mut file = match find_build_file(dir, &self.config.walk.build_file_names) {
            Some(path) => match build_file::load(&path) {
                Ok(file) => Some(file),
                Err(err) => {
                    let err = err.downcast::<BuildFileError>()?;
                    tracing::debug!("leaving {} untouched: {}", path.display(), err);
                    self.report.skipped.push(SkippedFile::new(&path, &err));
                    // Generators still see the directory; their output is dropped.
                    self.run_languages(dir, &rel, &files, None)?;
                    return Ok(());
                }
            },
            None => None,
        };

        let generated = self.run_languages(dir, &rel, &files, file.as_mut())?;

        let touched = !generated.is_empty() || file.as_ref().is_some_and(RuleFile::has_deleted);
        if !touched {
            return Ok(());
        }

        for rule in &generated {
            self.report.emitted.push(EmittedRule::new(&rel, rule));
        }

        let existed = file.is_some();
        let mut file = file.unwrap_or_else(|| {
            RuleFile::new(dir.join(self.config.walk.default_build_file_name()))
        });
        file.merge_generated(generated, &self.kinds);
        for load in &self.loads {
            file.ensure_load(load);
        }
        if !existed && file.rules().is_empty() {
            return Ok(());
        }

        if build_file::save_if_changed(&file, self.dry_run)? {
            if self.dry_run {
                tracing::info!("would update {}", file.path().display());
            } else {
                tracing::info!("updated {}", file.path().display());
            }
            self.report.written.push(file.path().to_path_buf());
        }

        Ok(())
    }

    fn run_languages(
        &self,
        dir: &Path,
        rel: &str,
        files: &[String],
        mut file: Option<&mut RuleFile>,
    ) -> Result<Vec<Rule>> {
        let mut generated: Vec<Rule> = Vec::new();
        for lang in self.languages {
            let result = lang
                .generate_rules(GenerateArgs {
                    root: &self.root,
                    dir,
                    rel,
                    regular_files: files,
                    file: file.as_deref_mut(),
                    other_gen: &generated,
                })
                .with_context(|| format!("`{}` generator failed in {}", lang.name(), dir.display()))?;
            generated.extend(result.gen);
        }
        Ok(generated)
    }
}
