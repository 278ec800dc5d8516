//! Project Configuration
//!
//! Handles parsing of `napigen.toml` configuration files.

use crate::extract::{ExtractOptions, MalformedPolicy, RedefinitionPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file searched for.
pub const CONFIG_FILE: &str = "napigen.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching napigen.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NapigenConfig {
    /// Signature extraction policies
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Type catalogue override
    #[serde(default)]
    pub catalogue: CatalogueConfig,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,

    /// node-gyp build step
    #[serde(default)]
    pub build: BuildConfig,
}

impl NapigenConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: NapigenConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Find and load configuration by searching up from the given directory.
    /// Defaults are returned when no file exists.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        match Self::find(start_dir) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Path of the nearest napigen.toml at or above `start_dir`.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Extraction options described by the `[extract]` section.
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            on_malformed: self.extract.on_malformed,
            on_redefinition: self.extract.on_redefinition,
        }
    }
}

/// Extraction policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExtractConfig {
    /// What to do with parameter fragments that are not `type name`
    #[serde(default)]
    pub on_malformed: MalformedPolicy,

    /// What to do when the target function is defined more than once
    #[serde(default)]
    pub on_redefinition: RedefinitionPolicy,
}

/// Type catalogue source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CatalogueConfig {
    /// JSON catalogue replacing the built-in table
    #[serde(default)]
    pub path: Option<String>,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving addon.c, manifest.json and build files
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Write binding.gyp and include.gypi
    #[serde(default = "default_true")]
    pub build_files: bool,
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            build_files: true,
        }
    }
}

/// Build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Run node-gyp after writing the files
    #[serde(default)]
    pub enabled: bool,

    /// Explicit node-gyp executable
    #[serde(default)]
    pub node_gyp: Option<String>,

    /// Module resolving manifest.json for include.gypi
    #[serde(default = "default_library_manifest")]
    pub library_manifest: String,

    /// Base directory for `@stdlib/*` packages
    #[serde(default = "default_stdlib_basedir")]
    pub stdlib_basedir: String,
}

fn default_library_manifest() -> String {
    crate::buildfiles::DEFAULT_LIBRARY_MANIFEST.to_string()
}

fn default_stdlib_basedir() -> String {
    "node_modules/@stdlib/stdlib".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            node_gyp: None,
            library_manifest: default_library_manifest(),
            stdlib_basedir: default_stdlib_basedir(),
        }
    }
}
