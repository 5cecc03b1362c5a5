//! Build declarations - the rules that live in BUILD files.
//!
//! A `Rule` is one call in a build file (`go_library(name = "x", ...)`).
//! A `RuleFile` is the parsed contents of a single build file: its load
//! statements and its rules, in file order.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;

/// The value of a single rule attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// A string literal (`name = "x"`)
    String(String),
    /// A list of string literals (`deps = ["a", "b"]`)
    List(Vec<String>),
    /// Any other expression, kept as written (`True`, `glob(["*.go"])`)
    Raw(String),
}

impl AttrValue {
    /// Check whether the value carries no content.
    pub fn is_empty(&self) -> bool {
        match self {
            AttrValue::String(s) => s.is_empty(),
            AttrValue::List(items) => items.is_empty(),
            AttrValue::Raw(text) => text.trim().is_empty(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(items: Vec<String>) -> Self {
        AttrValue::List(items)
    }
}

/// Per-kind contract that the host uses when merging generated rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindInfo {
    /// Attributes that must be present and non-empty for a rule to be valid
    pub non_empty_attrs: BTreeSet<String>,

    /// Attributes that are fully replaced on regeneration
    pub mergeable_attrs: BTreeSet<String>,
}

impl KindInfo {
    /// Create an empty kind contract.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require an attribute to be non-empty.
    pub fn with_non_empty(mut self, attr: impl Into<String>) -> Self {
        self.non_empty_attrs.insert(attr.into());
        self
    }

    /// Mark an attribute as mergeable.
    pub fn with_mergeable(mut self, attr: impl Into<String>) -> Self {
        self.mergeable_attrs.insert(attr.into());
        self
    }
}

/// A load statement: the label of a rules file and the symbols it exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadInfo {
    /// Label of the `.bzl` file (e.g., `//rules/go_mod:go_mod.bzl`)
    pub name: String,

    /// Symbols loaded from it
    pub symbols: Vec<String>,

    /// Comment lines written above the statement
    pub comments: Vec<String>,
}

impl LoadInfo {
    /// Create a new load statement.
    pub fn new(name: impl Into<String>, symbols: Vec<String>) -> Self {
        LoadInfo {
            name: name.into(),
            symbols,
            comments: Vec::new(),
        }
    }
}

/// A single build declaration.
///
/// Calls without a string `name` (`package(...)`, `exports_files([...])`)
/// are kept as rules with an empty name so they survive a rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    kind: String,
    name: String,
    /// Positional arguments, as written
    args: Vec<String>,
    /// Attributes other than `name`, in insertion order
    attrs: Vec<(String, AttrValue)>,
    comments: Vec<String>,
    deleted: bool,
}

impl Rule {
    /// Create a new rule with no attributes.
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Rule {
            kind: kind.into(),
            name: name.into(),
            args: Vec::new(),
            attrs: Vec::new(),
            comments: Vec::new(),
            deleted: false,
        }
    }

    /// Get the rule kind (the called function's name).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Get the rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the positional arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Append a positional argument.
    pub fn push_arg(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    /// Get the comment lines attached above the rule.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Replace the comment lines attached above the rule.
    pub fn set_comments(&mut self, comments: Vec<String>) {
        self.comments = comments;
    }

    /// Look up an attribute.
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up a string attribute.
    pub fn attr_string(&self, key: &str) -> Option<&str> {
        match self.attr(key) {
            Some(AttrValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Look up a list attribute.
    pub fn attr_strings(&self, key: &str) -> Option<&[String]> {
        match self.attr(key) {
            Some(AttrValue::List(items)) => Some(items),
            _ => None,
        }
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        let key = key.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((key, value)),
        }
    }

    /// Remove an attribute, returning its old value.
    pub fn remove_attr(&mut self, key: &str) -> Option<AttrValue> {
        let idx = self.attrs.iter().position(|(k, _)| k == key)?;
        Some(self.attrs.remove(idx).1)
    }

    /// Iterate over attributes (excluding `name`) in insertion order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Mark the rule for removal from its file.
    pub fn delete(&mut self) {
        self.deleted = true;
    }

    /// Check whether the rule has been marked for removal.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Check whether the rule is missing any attribute its kind requires.
    pub fn is_empty(&self, info: &KindInfo) -> bool {
        info.non_empty_attrs
            .iter()
            .any(|attr| self.attr(attr).map_or(true, AttrValue::is_empty))
    }
}

/// The parsed contents of one build file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFile {
    path: PathBuf,
    loads: Vec<LoadInfo>,
    rules: Vec<Rule>,
    /// Comments after the last statement
    trailing_comments: Vec<String>,
}

impl RuleFile {
    /// Create an empty build file at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RuleFile {
            path: path.into(),
            loads: Vec::new(),
            rules: Vec::new(),
            trailing_comments: Vec::new(),
        }
    }

    /// Create a build file from already-parsed parts.
    pub fn from_parts(path: impl Into<PathBuf>, loads: Vec<LoadInfo>, rules: Vec<Rule>) -> Self {
        RuleFile {
            path: path.into(),
            loads,
            rules,
            trailing_comments: Vec::new(),
        }
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the load statements.
    pub fn loads(&self) -> &[LoadInfo] {
        &self.loads
    }

    /// Get the rules in file order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Get mutable access to the rules.
    pub fn rules_mut(&mut self) -> &mut [Rule] {
        &mut self.rules
    }

    /// Get the comments that follow the last statement.
    pub fn trailing_comments(&self) -> &[String] {
        &self.trailing_comments
    }

    /// Replace the comments that follow the last statement.
    pub fn set_trailing_comments(&mut self, comments: Vec<String>) {
        self.trailing_comments = comments;
    }

    /// Append a rule.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Find a rule by kind and name.
    pub fn find(&self, kind: &str, name: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|r| r.kind() == kind && r.name() == name)
    }

    /// Check whether any rule is marked for removal.
    pub fn has_deleted(&self) -> bool {
        self.rules.iter().any(Rule::is_deleted)
    }

    /// Merge freshly generated rules into this file.
    ///
    /// A generated rule takes the position of an existing rule with the same
    /// kind and name. If that rule was marked deleted it is replaced outright,
    /// keeping its comments; otherwise generated attributes are set on it and mergeable attributes
    /// the generator no longer produces are dropped. Rules that are empty
    /// according to their kind contract are skipped. Rules still marked deleted
    /// after merging are removed.
    pub fn merge_generated(&mut self, generated: Vec<Rule>, kinds: &HashMap<String, KindInfo>) {
        for rule in generated {
            let info = kinds.get(rule.kind());
            if info.is_some_and(|info| rule.is_empty(info)) {
                tracing::debug!(
                    "skipping empty `{}` rule `{}` in {}",
                    rule.kind(),
                    rule.name(),
                    self.path.display()
                );
                continue;
            }

            let existing = self
                .rules
                .iter_mut()
                .find(|r| r.kind() == rule.kind() && r.name() == rule.name());

            match existing {
                Some(existing) if existing.is_deleted() => {
                    let comments = std::mem::take(&mut existing.comments);
                    *existing = rule;
                    if existing.comments.is_empty() {
                        existing.comments = comments;
                    }
                }
                Some(existing) => {
                    if let Some(info) = info {
                        for attr in &info.mergeable_attrs {
                            if rule.attr(attr).is_none() {
                                existing.remove_attr(attr);
                            }
                        }
                    }
                    for (key, value) in rule.attrs {
                        existing.set_attr(key, value);
                    }
                }
                None => self.push(rule),
            }
        }

        self.rules.retain(|r| !r.is_deleted());
    }

    /// Make sure the given symbols are loaded from `load.name`.
    ///
    /// Only symbols that some rule in the file actually uses are added.
    pub fn ensure_load(&mut self, load: &LoadInfo) {
        let used: Vec<String> = load
            .symbols
            .iter()
            .filter(|sym| self.rules.iter().any(|r| r.kind() == sym.as_str()))
            .cloned()
            .collect();
        if used.is_empty() {
            return;
        }

        match self.loads.iter_mut().find(|l| l.name == load.name) {
            Some(existing) => {
                for sym in used {
                    if !existing.symbols.contains(&sym) {
                        existing.symbols.push(sym);
                    }
                }
            }
            None => self.loads.push(LoadInfo::new(load.name.clone(), used)),
        }
    }
}
