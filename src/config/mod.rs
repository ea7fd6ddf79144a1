//! Configuration handling for devbuild
//!
//! Reads the optional `devbuild.toml` at the workspace root. Every field has
//! a default, so a workspace without the file behaves like a stock one.

mod schema;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DevError, Result};

pub use schema::*;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Workspace layout
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Bundling engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Workspace root directory
    #[serde(skip)]
    pub root: PathBuf,
}

impl Config {
    /// Load configuration for the workspace at `root`.
    ///
    /// `path` is resolved against `root` when relative. A missing file yields
    /// the defaults; an unreadable or malformed one is an error.
    pub fn load<P: AsRef<Path>>(root: &Path, path: P) -> Result<Self> {
        let path = root.join(path.as_ref());

        let mut config = match fs::read_to_string(&path) {
            Ok(content) => toml::from_str::<Config>(&content).map_err(|source| {
                DevError::ConfigParse {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                Config::default()
            }
            Err(source) => return Err(DevError::ConfigRead { path, source }),
        };

        config.root = root.to_path_buf();

        Ok(config)
    }

    /// Absolute path of the public packages directory
    pub fn packages_dir(&self) -> PathBuf {
        self.root.join(&self.workspace.packages_dir)
    }

    /// Absolute path of the private packages directory
    pub fn private_packages_dir(&self) -> PathBuf {
        self.root.join(&self.workspace.private_packages_dir)
    }

    /// The esbuild binary. A bare program name is left for `PATH` lookup;
    /// anything with a separator is taken relative to the workspace root.
    pub fn esbuild_path(&self) -> PathBuf {
        let program = &self.engine.esbuild;
        if program.components().count() > 1 {
            self.root.join(program)
        } else {
            program.clone()
        }
    }
}
