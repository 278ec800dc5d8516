//! napigen - N-API Addon Generator
//!
//! Reads a C source file, recognizes the function it defines, and emits the
//! glue needed to call that function from Node.js through the `@stdlib/napi`
//! macro family.
//!
//! # Outputs
//!
//! - **addon.c**: argument unpacking, the native call, and result creation
//! - **manifest.json**: sources, include dirs, and `@stdlib/napi/*` dependencies
//! - **binding.gyp / include.gypi**: node-gyp build files (CLI only)
//!
//! # Example
//!
//! ```rust
//! use napigen::{AddonGenerator, AddonRequest, ExtractOptions, TypeCatalogue};
//!
//! let catalogue = TypeCatalogue::builtin();
//! let generator = AddonGenerator::new(&catalogue, ExtractOptions::default());
//!
//! let source = "int add(int x, int y) { return x + y; }";
//! let request = AddonRequest::new(source, "add.c", "add.h", ".");
//! let artifacts = generator.generate(&request).unwrap();
//!
//! assert!(artifacts.glue_source.contains("STDLIB_NAPI_ARGV_INT32( env, x, argv, 0 );"));
//! assert_eq!(artifacts.manifest.dependencies()[0], "@stdlib/napi/export");
//! ```
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────────┐
//! │   C source      │
//! └────────┬────────┘
//!          │  extract (lexer + signature parser + catalogue)
//!          ▼
//! ┌─────────────────┐
//! │ FunctionDesc.   │  return type, name, typed parameters
//! └────────┬────────┘
//!          │  generate (bindings + dependencies)
//!          ▼
//! ┌─────────────────┐
//! │  ArtifactSet    │  addon.c + manifest.json
//! └─────────────────┘
//! ```

#![warn(clippy::all)]

pub mod buildfiles;
pub mod catalogue;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod extract;
pub mod generate;
pub mod toolchain;

pub use catalogue::{BindingKey, BindingSpec, CatalogueError, CreateKey, TypeCatalogue};
pub use config::{ConfigError, NapigenConfig};
pub use descriptor::{ArgumentBinding, FunctionDescriptor, Parameter, ReturnType};
pub use error::{Error, Result};
pub use extract::{
    ExtractError, ExtractOptions, Extractor, MalformedPolicy, RedefinitionPolicy,
};
pub use generate::manifest::{ManifestError, ManifestFragment};
pub use generate::{ArtifactSet, GenerateError, Generator, GlueTarget};

use log::info;
use std::path::Path;

/// Everything needed to generate one addon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonRequest {
    /// C source text
    pub source: String,
    /// File name of the source, referenced from manifest.json as `./<name>`
    pub source_file: String,
    /// File name of the header, included from addon.c
    pub header_file: String,
    /// Directory containing the header
    pub include_dir: String,
}

impl AddonRequest {
    pub fn new(
        source: impl Into<String>,
        source_file: impl Into<String>,
        header_file: impl Into<String>,
        include_dir: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            source_file: source_file.into(),
            header_file: header_file.into(),
            include_dir: include_dir.into(),
        }
    }

    /// Build a request from on-disk paths: file names are taken from the
    /// paths and the include dir is the header's parent directory.
    pub fn from_paths(source: impl Into<String>, source_path: &Path, header_path: &Path) -> Self {
        let include_dir = header_path
            .parent()
            .map(|dir| dir.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(
            source,
            file_name(source_path),
            file_name(header_path),
            include_dir,
        )
    }

    fn target(&self) -> GlueTarget<'_> {
        GlueTarget {
            header_file: &self.header_file,
            source_file: &self.source_file,
            include_dir: &self.include_dir,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Extract-then-generate pipeline over a shared catalogue.
pub struct AddonGenerator<'c> {
    extractor: Extractor<'c>,
    generator: Generator<'c>,
}

impl<'c> AddonGenerator<'c> {
    pub fn new(catalogue: &'c TypeCatalogue, options: ExtractOptions) -> Self {
        Self {
            extractor: Extractor::new(catalogue, options),
            generator: Generator::new(catalogue),
        }
    }

    /// Descriptor of the request's target function.
    pub fn describe(&self, request: &AddonRequest) -> Result<FunctionDescriptor> {
        Ok(self.extractor.extract(&request.source)?)
    }

    /// Produce addon.c and manifest.json for the request.
    pub fn generate(&self, request: &AddonRequest) -> Result<ArtifactSet> {
        let desc = self.describe(request)?;
        info!("Generating addon for {}", desc);
        Ok(self.generator.generate(&desc, &request.target())?)
    }
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
