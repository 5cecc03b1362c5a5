//! modbound - module-boundary rules for build files
//!
//! Walks a source tree and keeps one module rule per manifest directory
//! (`go_mod` next to each `go.mod` by default) whose `deps` list every
//! library declared beneath that manifest.

pub mod build_file;
pub mod core;
pub mod lang;
pub mod ops;
pub mod util;

/// Test utilities for modbound unit tests.
///
/// This module is only available when running tests. It provides an on-disk
/// tree fixture and a host emulation for driving generators.
#[cfg(test)]
pub mod test_support;

pub use self::core::{
    boundary::{BoundaryError, BoundaryResolver, Resolution},
    manifest::{ManifestError, ModuleDir},
    rule::{AttrValue, KindInfo, LoadInfo, Rule, RuleFile},
};

pub use lang::{GenerateArgs, GenerateResult, Language, ModuleLanguage};
pub use util::config::Config;
