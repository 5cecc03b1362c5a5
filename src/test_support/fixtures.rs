//! Canned file contents and rules for tests.

use crate::core::{Rule, RuleFile};

/// Contents of a minimal `go.mod`.
pub fn go_mod(module: &str) -> String {
    format!("module {module}\n\ngo 1.22\n")
}

/// A `go_library` rule.
pub fn library(name: &str) -> Rule {
    Rule::new("go_library", name)
}

/// A `go_library` rule already marked for removal.
pub fn deleted_library(name: &str) -> Rule {
    let mut rule = library(name);
    rule.delete();
    rule
}

/// An in-memory build file holding the given rules.
pub fn rule_file(rules: Vec<Rule>) -> RuleFile {
    RuleFile::from_parts("BUILD.bazel", Vec::new(), rules)
}

/// Build file text declaring one `go_library` per name.
pub fn library_build(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| format!("go_library(\n    name = \"{name}\",\n)\n"))
        .collect::<Vec<_>>()
        .join("\n")
}
