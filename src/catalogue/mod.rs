//! Type Catalogue
//!
//! Maps native C type spellings onto the `@stdlib/napi` binding macros that
//! move values across the N-API boundary, together with the headers and
//! manifest dependencies each binding needs.
//!
//! The catalogue is plain configuration data. It is built once (from the
//! stock table or a JSON document) and then passed by reference into the
//! extractor and the generator; nothing here is mutated after construction.
//!
//! # Example
//!
//! ```
//! use napigen::catalogue::{BindingKey, TypeCatalogue};
//!
//! let catalogue = TypeCatalogue::builtin();
//! assert_eq!(catalogue.lookup("double", 1), Some(BindingKey::Float64Array));
//! assert_eq!(catalogue.lookup("const  double", 0), Some(BindingKey::Double));
//! assert_eq!(catalogue.lookup("double", 2), None);
//! ```

mod builtin;
mod types;

pub use types::{BindingKey, BindingSpec, CreateKey};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised while building a catalogue.
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("Failed to read catalogue: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalogue: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown binding key: {0}")]
    UnknownKey(String),

    #[error("Binding key {0} has no header/macro entry")]
    MissingBinding(BindingKey),

    #[error("Creation key {0} has no header/macro entry")]
    MissingCreator(CreateKey),
}

/// Headers and macros every generated addon uses regardless of its signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSpec {
    #[serde(default = "default_export_header")]
    pub export_header: String,
    #[serde(default = "default_argv_header")]
    pub argv_header: String,
    #[serde(default = "default_node_api_header")]
    pub node_api_header: String,
    #[serde(default = "default_argv_macro")]
    pub argv_macro: String,
    #[serde(default = "default_export_macro")]
    pub export_macro: String,
    /// Key of the export capability dependency, e.g. `export`
    #[serde(default = "default_export_dependency")]
    pub export_dependency: String,
}

fn default_export_header() -> String {
    builtin::EXPORT_HEADER.to_string()
}

fn default_argv_header() -> String {
    builtin::ARGV_HEADER.to_string()
}

fn default_node_api_header() -> String {
    builtin::NODE_API_HEADER.to_string()
}

fn default_argv_macro() -> String {
    builtin::ARGV_MACRO.to_string()
}

fn default_export_macro() -> String {
    builtin::EXPORT_MACRO.to_string()
}

fn default_export_dependency() -> String {
    builtin::EXPORT_DEPENDENCY.to_string()
}

fn default_dependency_prefix() -> String {
    builtin::DEPENDENCY_PREFIX.to_string()
}

impl Default for RuntimeSpec {
    fn default() -> Self {
        Self {
            export_header: default_export_header(),
            argv_header: default_argv_header(),
            node_api_header: default_node_api_header(),
            argv_macro: default_argv_macro(),
            export_macro: default_export_macro(),
            export_dependency: default_export_dependency(),
        }
    }
}

/// On-disk shape of a catalogue (JSON).
///
/// Keys of `bindings` and `create` are catalogue spellings such as
/// `argv_double` and `create_int32`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogueDocument {
    #[serde(default = "default_dependency_prefix")]
    pub dependency_prefix: String,

    /// Native spelling -> binding key
    #[serde(default)]
    pub types: BTreeMap<String, String>,

    /// Binding key -> header/macro
    #[serde(default)]
    pub bindings: BTreeMap<String, BindingSpec>,

    /// Creation key -> header/macro
    #[serde(default)]
    pub create: BTreeMap<String, BindingSpec>,

    #[serde(default)]
    pub runtime: RuntimeSpec,
}

/// Immutable type catalogue shared by the extractor and the generator.
#[derive(Debug, Clone)]
pub struct TypeCatalogue {
    types: BTreeMap<String, BindingKey>,
    bindings: BTreeMap<BindingKey, BindingSpec>,
    creators: BTreeMap<CreateKey, BindingSpec>,
    runtime: RuntimeSpec,
    dependency_prefix: String,
}

impl TypeCatalogue {
    /// Create an empty catalogue with the stock runtime headers.
    pub fn empty() -> Self {
        Self {
            types: BTreeMap::new(),
            bindings: BTreeMap::new(),
            creators: BTreeMap::new(),
            runtime: RuntimeSpec::default(),
            dependency_prefix: default_dependency_prefix(),
        }
    }

    /// The stock `@stdlib/napi` catalogue.
    pub fn builtin() -> Self {
        let mut catalogue = Self::empty();
        for key in BindingKey::ALL {
            catalogue
                .bindings
                .insert(key, BindingSpec::stdlib(key.as_str()));
        }
        for key in CreateKey::ALL {
            catalogue
                .creators
                .insert(key, BindingSpec::stdlib(key.as_str()));
        }
        for (spelling, key) in builtin::BUILTIN_TYPES {
            catalogue.types.insert(normalize_spelling(spelling), *key);
        }
        catalogue
    }

    /// Build a catalogue from a parsed document, checking that every type
    /// resolves to a key with a header/macro entry.
    pub fn from_document(doc: CatalogueDocument) -> Result<Self, CatalogueError> {
        let mut catalogue = Self::empty();
        catalogue.runtime = doc.runtime;
        catalogue.dependency_prefix = doc.dependency_prefix;

        for (name, spec) in doc.bindings {
            let key =
                BindingKey::from_key(&name).ok_or_else(|| CatalogueError::UnknownKey(name))?;
            catalogue.bindings.insert(key, spec);
        }

        for (name, spec) in doc.create {
            let key = CreateKey::ALL
                .into_iter()
                .find(|k| k.as_str() == name)
                .ok_or_else(|| CatalogueError::UnknownKey(name))?;
            catalogue.creators.insert(key, spec);
        }

        for (spelling, name) in doc.types {
            let key =
                BindingKey::from_key(&name).ok_or_else(|| CatalogueError::UnknownKey(name))?;
            if !catalogue.bindings.contains_key(&key) {
                return Err(CatalogueError::MissingBinding(key));
            }
            catalogue.types.insert(normalize_spelling(&spelling), key);
        }

        for key in CreateKey::ALL {
            if !catalogue.creators.contains_key(&key) {
                return Err(CatalogueError::MissingCreator(key));
            }
        }

        Ok(catalogue)
    }

    /// Parse from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, CatalogueError> {
        let doc: CatalogueDocument = serde_json::from_str(json)?;
        Self::from_document(doc)
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Export the catalogue in its on-disk shape.
    pub fn to_document(&self) -> CatalogueDocument {
        CatalogueDocument {
            dependency_prefix: self.dependency_prefix.clone(),
            types: self
                .types
                .iter()
                .map(|(spelling, key)| (spelling.clone(), key.as_str().to_string()))
                .collect(),
            bindings: self
                .bindings
                .iter()
                .map(|(key, spec)| (key.as_str().to_string(), spec.clone()))
                .collect(),
            create: self
                .creators
                .iter()
                .map(|(key, spec)| (key.as_str().to_string(), spec.clone()))
                .collect(),
            runtime: self.runtime.clone(),
        }
    }

    /// Register (or replace) a native spelling, using the stock header and
    /// macro for `key` if none is registered yet.
    pub fn with_type(mut self, spelling: &str, key: BindingKey) -> Self {
        self.bindings
            .entry(key)
            .or_insert_with(|| BindingSpec::stdlib(key.as_str()));
        self.types.insert(normalize_spelling(spelling), key);
        self
    }

    /// Replace the header/macro used for a binding key.
    pub fn with_binding(mut self, key: BindingKey, spec: BindingSpec) -> Self {
        self.bindings.insert(key, spec);
        self
    }

    /// Replace the header/macro used for a creation key.
    pub fn with_creator(mut self, key: CreateKey, spec: BindingSpec) -> Self {
        self.creators.insert(key, spec);
        self
    }

    /// Resolve a base type and pointer depth to its binding key.
    ///
    /// `base` is compared whitespace- and `const`-insensitively. Pointer depths
    /// above one never resolve.
    pub fn lookup(&self, base: &str, pointer_depth: usize) -> Option<BindingKey> {
        if pointer_depth > 1 {
            return None;
        }
        let mut spelling = normalize_spelling(base);
        if pointer_depth == 1 {
            spelling.push('*');
        }
        self.types.get(&spelling).copied()
    }

    /// Header/macro for a binding key
    pub fn binding(&self, key: BindingKey) -> Option<&BindingSpec> {
        self.bindings.get(&key)
    }

    /// Header/macro for a creation key
    pub fn creator(&self, key: CreateKey) -> Option<&BindingSpec> {
        self.creators.get(&key)
    }

    pub fn runtime(&self) -> &RuntimeSpec {
        &self.runtime
    }

    /// Manifest dependency for a catalogue key spelling, e.g.
    /// `argv_float64array` -> `@stdlib/napi/argv-float64array`.
    pub fn dependency_for(&self, key: &str) -> String {
        format!("{}{}", self.dependency_prefix, key.replace('_', "-"))
    }

    /// Manifest dependency for the export capability
    pub fn export_dependency(&self) -> String {
        self.dependency_for(&self.runtime.export_dependency)
    }

    /// Iterate over registered spellings in sorted order
    pub fn types(&self) -> impl Iterator<Item = (&str, BindingKey)> {
        self.types.iter().map(|(s, k)| (s.as_str(), *k))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeCatalogue {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Normalize a native type spelling: drop `const`, collapse whitespace and
/// glue pointer stars onto the base (`const double *` -> `double*`).
pub fn normalize_spelling(spelling: &str) -> String {
    let depth = spelling.matches('*').count();
    let base = spelling
        .replace('*', " ")
        .split_whitespace()
        .filter(|word| *word != "const")
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}{}", base, "*".repeat(depth))
}
