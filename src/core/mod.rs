//! Core data structures for modbound.
//!
//! - Build declarations (`Rule`, `RuleFile`) and their kind contracts
//! - Label formatting for target references
//! - Manifest parsing and module boundary resolution

pub mod boundary;
pub mod label;
pub mod manifest;
pub mod rule;

pub use boundary::{BoundaryError, BoundaryResolver, Resolution};
pub use label::format_label;
pub use manifest::{ManifestError, ModuleDir};
pub use rule::{AttrValue, KindInfo, LoadInfo, Rule, RuleFile};
