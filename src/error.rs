//! Error types for devbuild

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving a workspace or driving the engine.
///
/// Every variant is fatal for the process. Resolution errors stop the run
/// before any session opens.
#[derive(Debug, Error)]
pub enum DevError {
    /// No `package.json` for the target in either package group
    #[error("Failed to read package manifest: {}", .path.display())]
    ManifestNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest exists but is not valid JSON of the expected shape
    #[error("Failed to parse package manifest: {}", .path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A sibling tool's manifest could not be found through node_modules
    #[error("Cannot resolve '{package}' from {}", .from.display())]
    PackageNotResolved { package: String, from: PathBuf },

    /// devbuild.toml exists but cannot be read
    #[error("Failed to read {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// devbuild.toml is present but malformed
    #[error("Failed to parse {}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The engine binary could not be started
    #[error("Failed to start bundling engine '{}'", .program.display())]
    EngineSpawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file watcher could not be created or attached
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),
}

/// Result alias for devbuild library operations
pub type Result<T> = std::result::Result<T, DevError>;
