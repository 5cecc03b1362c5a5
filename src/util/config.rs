//! Configuration file support for modbound.
//!
//! modbound supports two configuration file locations:
//! - Global: `~/.modbound/config.toml` - User-wide defaults
//! - Project: `<root>/.modbound.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Every key is optional;
//! anything left unset keeps its built-in default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Fully resolved modbound configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Manifest file conventions
    pub manifest: ManifestConfig,

    /// Generated rule conventions
    pub rule: RuleConfig,

    /// Tree walk settings
    pub walk: WalkConfig,
}

/// Manifest and lock file conventions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestConfig {
    /// Manifest filename that marks a module boundary
    pub file: String,

    /// Companion lock/checksum filename
    pub lock_file: String,

    /// Directive keyword that declares the module identity
    pub directive: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        ManifestConfig {
            file: "go.mod".to_string(),
            lock_file: "go.sum".to_string(),
            directive: "module".to_string(),
        }
    }
}

/// Conventions for the generated module rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleConfig {
    /// Kind of the generated rule
    pub kind: String,

    /// Name given to a new rule when none exists yet
    pub name: String,

    /// Kind of the library rules that are collected into `deps`
    pub library_kind: String,

    /// Label of the `.bzl` file that defines `kind`
    pub load: String,
}

impl Default for RuleConfig {
    fn default() -> Self {
        RuleConfig {
            kind: "go_mod".to_string(),
            name: "go_mod_dir".to_string(),
            library_kind: "go_library".to_string(),
            load: "//rules/go_mod:go_mod.bzl".to_string(),
        }
    }
}

/// Tree walk settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalkConfig {
    /// Build file names to look for, in priority order. The first is used
    /// when creating a new file.
    pub build_file_names: Vec<String>,

    /// Glob patterns (relative to the root) of directories to skip
    pub exclude: Vec<String>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        WalkConfig {
            build_file_names: vec!["BUILD.bazel".to_string(), "BUILD".to_string()],
            exclude: Vec::new(),
        }
    }
}

impl WalkConfig {
    /// Name to use when creating a new build file.
    pub fn default_build_file_name(&self) -> &str {
        self.build_file_names
            .first()
            .map(String::as_str)
            .unwrap_or("BUILD.bazel")
    }
}

/// On-disk configuration; every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub manifest: ManifestSection,
    pub rule: RuleSection,
    pub walk: WalkSection,
}

/// `[manifest]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestSection {
    pub file: Option<String>,
    pub lock_file: Option<String>,
    pub directive: Option<String>,
}

/// `[rule]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleSection {
    pub kind: Option<String>,
    pub name: Option<String>,
    pub library_kind: Option<String>,
    pub load: Option<String>,
}

/// `[walk]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalkSection {
    pub build_file_names: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

impl ConfigFile {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load a configuration file with fallback to an empty one if it doesn't
    /// exist or can't be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }
}

impl Config {
    /// Apply the keys set in `file` on top of this config.
    pub fn merge(&mut self, file: ConfigFile) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut self.manifest.file, file.manifest.file);
        set(&mut self.manifest.lock_file, file.manifest.lock_file);
        set(&mut self.manifest.directive, file.manifest.directive);

        set(&mut self.rule.kind, file.rule.kind);
        set(&mut self.rule.name, file.rule.name);
        set(&mut self.rule.library_kind, file.rule.library_kind);
        set(&mut self.rule.load, file.rule.load);

        set(&mut self.walk.build_file_names, file.walk.build_file_names);
        set(&mut self.walk.exclude, file.walk.exclude);
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`<root>/.modbound.toml`)
/// 2. Global config (`~/.modbound/config.toml`)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(ConfigFile::load_or_default(global_path));
    }

    config.merge(ConfigFile::load_or_default(project_path));

    config
}

/// Get the global modbound config directory (~/.modbound).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".modbound"))
}

/// Get the global config path (~/.modbound/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (<root>/.modbound.toml).
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(".modbound.toml")
}
