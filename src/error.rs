//! Crate-level error type

use crate::catalogue::CatalogueError;
use crate::config::ConfigError;
use crate::extract::ExtractError;
use crate::generate::manifest::ManifestError;
use crate::generate::GenerateError;
use crate::toolchain::ToolchainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),
}

pub type Result<T> = std::result::Result<T, Error>;
