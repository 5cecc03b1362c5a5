//! Command implementations

pub mod completions;
pub mod generate;
pub mod resolve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use modbound::util::config::{global_config_path, load_config, project_config_path};
use modbound::Config;

/// Resolve the root argument, defaulting to the current directory.
pub fn root_dir(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(root) => Ok(root),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

/// Load global and project configuration for `root`.
pub fn config_for(root: &Path) -> Config {
    let global = global_config_path();
    load_config(global.as_deref(), &project_config_path(root))
}
