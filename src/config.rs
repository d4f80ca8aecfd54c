//! Project configuration module.
//!
//! Handles loading, validating, and merging `amplitude.toml`. Configuration
//! is layered, each layer overriding the ones before it:
//!
//! 1. stock defaults
//! 2. `amplitude.toml` in the project root
//! 3. an extra file named with `--config` (e.g. a per-machine compiler path)
//! 4. command-line flags
//!
//! Relative paths in any file resolve against the project root.
//!
//! ## Config File Location
//!
//! ```text
//! project/
//! ├── amplitude.toml           # Optional, overrides stock defaults
//! ├── pc.config.json
//! ├── sounds/
//! └── ...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [compiler]
//! program = "flatc"         # Name on PATH, or a path to the executable
//!
//! [schemas]
//! dirs = ["schemas"]        # Searched in order; relative to the project root
//! extension = "bfbs"        # "fbs" to compile against text schemas
//!
//! [sources]
//! extension = "json"        # Description files inside category directories
//!
//! [build]
//! output = "build"          # Artifact root; relative to the project root
//! keep_going = false        # Attempt every unit even after a failure
//! # assets = "raw"          # Directory copied verbatim into the output
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse, override just the values you want:
//!
//! ```toml
//! [schemas]
//! dirs = ["../sdk/schemas", "schemas"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the project root.
pub const CONFIG_FILE: &str = "amplitude.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `amplitude.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// External schema compiler.
    pub compiler: CompilerConfig,
    /// Where compiled schemas are looked up.
    pub schemas: SchemasConfig,
    /// Description file settings.
    pub sources: SourcesConfig,
    /// Output and failure handling.
    pub build: BuildSection,
}

impl BuildConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compiler.program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "compiler.program must not be empty".into(),
            ));
        }
        validate_extension("schemas.extension", &self.schemas.extension)?;
        validate_extension("sources.extension", &self.sources.extension)?;
        if self.build.output.trim().is_empty() {
            return Err(ConfigError::Validation(
                "build.output must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Schema search directories, resolved against `root`.
    pub fn schema_dirs(&self, root: &Path) -> Vec<PathBuf> {
        self.schemas.dirs.iter().map(|d| root.join(d)).collect()
    }

    /// Artifact root, resolved against `root`.
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.build.output)
    }

    /// Raw asset directory, resolved against `root`.
    pub fn assets_dir(&self, root: &Path) -> Option<PathBuf> {
        self.build.assets.as_ref().map(|d| root.join(d))
    }
}

fn validate_extension(key: &str, extension: &str) -> Result<(), ConfigError> {
    if extension.is_empty() {
        return Err(ConfigError::Validation(format!("{key} must not be empty")));
    }
    if extension.starts_with('.') {
        return Err(ConfigError::Validation(format!(
            "{key} must not start with a dot (got \"{extension}\")"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Program name or path of the schema compiler.
    pub program: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: "flatc".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemasConfig {
    /// Search directories, in priority order.
    pub dirs: Vec<String>,
    /// Schema file extension, without the dot.
    pub extension: String,
}

impl Default for SchemasConfig {
    fn default() -> Self {
        Self {
            dirs: vec!["schemas".to_string()],
            extension: "bfbs".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesConfig {
    /// Description file extension, without the dot.
    pub extension: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            extension: "json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    /// Artifact root.
    pub output: String,
    /// Continue past compile failures.
    pub keep_going: bool,
    /// Directory copied verbatim into the output before compiling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            output: "build".to_string(),
            keep_going: false,
            assets: None,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(BuildConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `amplitude.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    read_toml(&config_path).map(Some)
}

/// Read an explicitly named config file. Unlike the project file it must exist.
pub fn read_toml(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BuildConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BuildConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the layered config for the project at `root`.
///
/// Stock defaults, then `amplitude.toml` from `root`, then `extra` when
/// given. Unknown keys in any layer are rejected and the merged result is
/// validated.
pub fn load_config(root: &Path, extra: Option<&Path>) -> Result<BuildConfig, ConfigError> {
    let mut base = stock_defaults_value()?;
    if let Some(project) = load_raw_config(root)? {
        base = merge_toml(base, project);
    }
    let overlay = extra.map(read_toml).transpose()?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `amplitude.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Amplitude Build Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the project root, next to the description files.
# A file passed with --config is layered on top of it.
# Relative paths resolve against the project root.
# Command-line flags override values set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Schema compiler
# ---------------------------------------------------------------------------
[compiler]
# Program name looked up on PATH, or a path to the flatc executable.
program = "flatc"

# ---------------------------------------------------------------------------
# Schemas
# ---------------------------------------------------------------------------
[schemas]
# Directories searched, in order, for <schema>.<extension>.
# Also passed to the compiler as include paths.
dirs = ["schemas"]

# Schema file extension: "bfbs" for binary schemas, "fbs" for text schemas.
extension = "bfbs"

# ---------------------------------------------------------------------------
# Description files
# ---------------------------------------------------------------------------
[sources]
# Extension of the files discovered inside category directories.
extension = "json"

# ---------------------------------------------------------------------------
# Build
# ---------------------------------------------------------------------------
[build]
# Root of the compiled artifact tree.
output = "build"

# Keep compiling remaining files after one fails, then report every failure.
keep_going = false

# Directory whose files are copied verbatim into the output before compiling.
# assets = "raw"
"##
}
