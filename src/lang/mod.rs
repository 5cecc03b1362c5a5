//! Rule generators.
//!
//! A `Language` is called once per directory during a walk, children before
//! parents. It sees the directory's existing build file and the rules that
//! generators earlier in the chain produced for the same directory, and
//! returns the rules it wants merged into the file.

pub mod module;
pub mod state;

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;

use crate::core::{KindInfo, LoadInfo, Rule, RuleFile};

pub use module::ModuleLanguage;
pub use state::AggregationState;

/// Per-directory input to a generator.
#[derive(Debug)]
pub struct GenerateArgs<'a> {
    /// Normalized root of the walk
    pub root: &'a Path,

    /// Absolute path of the visited directory
    pub dir: &'a Path,

    /// Slash-separated path of `dir` relative to `root` (`""` for the root)
    pub rel: &'a str,

    /// Names of the regular files in `dir`
    pub regular_files: &'a [String],

    /// The existing build file, if there is one
    pub file: Option<&'a mut RuleFile>,

    /// Rules generated for `dir` by earlier generators
    pub other_gen: &'a [Rule],
}

/// Import information attached to a generated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub lang: String,
    pub imp: String,
}

/// Output of a generator for one directory.
#[derive(Debug, Default)]
pub struct GenerateResult {
    /// Rules to merge into the directory's build file
    pub gen: Vec<Rule>,

    /// One entry per rule in `gen`; `None` when no import resolution applies
    pub imports: Vec<Option<ImportSpec>>,
}

impl GenerateResult {
    /// A result with a single rule and no import information.
    pub fn single(rule: Rule) -> Self {
        GenerateResult {
            gen: vec![rule],
            imports: vec![None],
        }
    }
}

/// A rule generator.
pub trait Language: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Contracts for the rule kinds this generator emits.
    fn kinds(&self) -> HashMap<String, KindInfo>;

    /// Load statements needed by the rule kinds this generator emits.
    fn loads(&self) -> Vec<LoadInfo>;

    /// Generate rules for one directory.
    fn generate_rules(&self, args: GenerateArgs<'_>) -> Result<GenerateResult>;
}
