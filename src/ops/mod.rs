//! High-level operations.
//!
//! This module contains the implementation of modbound commands.

pub mod generate;
pub mod resolve;

pub use generate::{generate, generate_with, EmittedRule, GenerateOptions, GenerateReport, SkippedFile};
pub use resolve::resolve_boundary;
