//! Configuration schema definitions

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Workspace layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory holding the public packages
    #[serde(default = "default_packages_dir")]
    pub packages_dir: String,

    /// Directory holding the private packages, searched first
    #[serde(default = "default_private_packages_dir")]
    pub private_packages_dir: String,

    /// Entry module relative to a package root
    #[serde(default = "default_entry")]
    pub entry: String,

    /// Package whose file name the compatibility build reuses
    #[serde(default = "default_primary_package")]
    pub primary_package: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            packages_dir: default_packages_dir(),
            private_packages_dir: default_private_packages_dir(),
            entry: default_entry(),
            primary_package: default_primary_package(),
        }
    }
}

fn default_packages_dir() -> String {
    "packages".to_string()
}

fn default_private_packages_dir() -> String {
    "packages-private".to_string()
}

fn default_entry() -> String {
    "src/index.ts".to_string()
}

fn default_primary_package() -> String {
    "vue".to_string()
}

/// Bundling engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// esbuild binary; a bare name is looked up on PATH, other relative
    /// paths resolve against the workspace root
    #[serde(default = "default_esbuild")]
    pub esbuild: PathBuf,

    /// Debounce window for file change events
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// esbuild log level for its own diagnostics
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            esbuild: default_esbuild(),
            debounce_ms: default_debounce_ms(),
            log_level: default_log_level(),
        }
    }
}

fn default_esbuild() -> PathBuf {
    PathBuf::from("node_modules/.bin/esbuild")
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_log_level() -> String {
    "warning".to_string()
}
