//! Addon Manifest (manifest.json)
//!
//! The dependency/source/include descriptor read by
//! `@stdlib/utils/library-manifest` when the addon is built.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// manifest.json document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestFragment {
    /// Build options (always empty for generated addons)
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,

    /// How each configuration field is resolved
    pub fields: Vec<ManifestField>,

    /// Build configurations
    pub confs: Vec<ManifestConf>,
}

/// Resolution rule for one configuration field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestField {
    pub field: String,
    pub resolve: bool,
    pub relative: bool,
}

impl ManifestField {
    fn new(field: &str, resolve: bool, relative: bool) -> Self {
        Self {
            field: field.to_string(),
            resolve,
            relative,
        }
    }
}

/// One build configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestConf {
    #[serde(default)]
    pub src: Vec<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub libraries: Vec<String>,
    #[serde(default)]
    pub libpath: Vec<String>,
    /// Ordered, de-duplicated package dependencies
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl ManifestFragment {
    /// Create the manifest for one addon source.
    ///
    /// `source_file` is referenced relative to the manifest (`./<file>`);
    /// `include_dir` is the directory holding the target header.
    pub fn new(source_file: &str, include_dir: &str, dependencies: Vec<String>) -> Self {
        let include_dir = match include_dir.trim_end_matches('/') {
            "" if include_dir.is_empty() => ".",
            trimmed => trimmed,
        };

        Self {
            options: serde_json::Map::new(),
            fields: vec![
                ManifestField::new("src", true, true),
                ManifestField::new("include", true, true),
                ManifestField::new("libraries", false, false),
                ManifestField::new("libpath", true, false),
            ],
            confs: vec![ManifestConf {
                src: vec![format!("./{}", source_file)],
                include: vec![format!("{}/", include_dir)],
                libraries: Vec::new(),
                libpath: Vec::new(),
                dependencies,
            }],
        }
    }

    /// Dependencies of the first configuration
    pub fn dependencies(&self) -> &[String] {
        self.confs
            .first()
            .map(|conf| conf.dependencies.as_slice())
            .unwrap_or(&[])
    }

    /// Load manifest from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let file = File::open(path.as_ref()).map_err(|e| ManifestError::Io(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| ManifestError::Parse(e.to_string()))
    }

    /// Save manifest to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ManifestError> {
        let file = File::create(path.as_ref()).map_err(|e| ManifestError::Io(e.to_string()))?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| ManifestError::Serialize(e.to_string()))
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(json).map_err(|e| ManifestError::Parse(e.to_string()))
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(|e| ManifestError::Serialize(e.to_string()))
    }
}

/// Manifest error types
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
}
