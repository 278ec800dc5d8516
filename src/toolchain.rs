//! node-gyp Invocation
//!
//! Runs `node-gyp clean` followed by `node-gyp configure build` in the
//! directory holding `binding.gyp`.

use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Toolchain errors.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("node-gyp not found (looked for {0} and on PATH)")]
    NotFound(String),

    #[error("Failed to launch node-gyp: {0}")]
    Io(#[from] std::io::Error),

    #[error("node-gyp {step} failed with status {status}")]
    Failed { step: String, status: String },
}

pub type ToolchainResult<T> = Result<T, ToolchainError>;

/// Local install location relative to the project directory.
const LOCAL_NODE_GYP: &str = "node_modules/.bin/node-gyp";

/// A located node-gyp executable.
#[derive(Debug, Clone)]
pub struct NodeGyp {
    program: PathBuf,
    working_dir: PathBuf,
}

impl NodeGyp {
    /// Locate node-gyp: explicit override, then the project-local install
    /// under `working_dir`, then `PATH`.
    pub fn locate(override_path: Option<&Path>, working_dir: &Path) -> ToolchainResult<Self> {
        if let Some(path) = override_path {
            let program = if path.is_relative() {
                working_dir.join(path)
            } else {
                path.to_path_buf()
            };
            if !program.exists() {
                return Err(ToolchainError::NotFound(program.display().to_string()));
            }
            return Ok(Self::new(program, working_dir));
        }

        let local = working_dir.join(LOCAL_NODE_GYP);
        if local.exists() {
            return Ok(Self::new(local, working_dir));
        }

        which::which("node-gyp")
            .map(|program| Self::new(program, working_dir))
            .map_err(|_| ToolchainError::NotFound(local.display().to_string()))
    }

    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Remove previous build output.
    pub fn clean(&self) -> ToolchainResult<()> {
        self.run("clean", &["clean"])
    }

    /// Generate the build project and compile the addon.
    pub fn configure_and_build(&self) -> ToolchainResult<()> {
        self.run("configure build", &["configure", "build"])
    }

    /// `clean` then `configure build`.
    pub fn rebuild(&self) -> ToolchainResult<()> {
        self.clean()?;
        self.configure_and_build()
    }

    fn run(&self, step: &str, args: &[&str]) -> ToolchainResult<()> {
        info!("Running {} {}", self.program.display(), step);
        let status = Command::new(&self.program)
            .args(args)
            .current_dir(&self.working_dir)
            .status()?;
        debug!("node-gyp {} exited with {}", step, status);

        if !status.success() {
            return Err(ToolchainError::Failed {
                step: step.to_string(),
                status: status
                    .code()
                    .map(|code| code.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
            });
        }
        Ok(())
    }
}
