//! Workspace package resolution
//!
//! Locates a target's package directory (private group first, then public)
//! and resolves sibling packages through `node_modules` the way Node does.

mod manifest;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{DevError, Result};

pub use manifest::{BuildOptions, PackageManifest};

/// Which package directory a target lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageGroup {
    Private,
    Public,
}

/// Workspace layout with the private package listing taken once at startup
#[derive(Debug, Clone)]
pub struct Workspace {
    packages_dir: PathBuf,
    private_packages_dir: PathBuf,
    private_packages: BTreeSet<String>,
    entry: String,
    primary_package: String,
}

impl Workspace {
    /// Build a workspace from configuration, listing the private packages
    /// directory. A missing directory means no private packages.
    pub fn discover(config: &Config) -> Self {
        let private_dir = config.private_packages_dir();
        let private_packages = list_packages(&private_dir);

        debug!(
            "Found {} private package(s) in {}",
            private_packages.len(),
            private_dir.display()
        );

        Self::new(config, private_packages)
    }

    /// Build a workspace from configuration and an explicit private set
    pub fn new(config: &Config, private_packages: BTreeSet<String>) -> Self {
        Self {
            packages_dir: config.packages_dir(),
            private_packages_dir: config.private_packages_dir(),
            private_packages,
            entry: config.workspace.entry.clone(),
            primary_package: config.workspace.primary_package.clone(),
        }
    }

    /// Group the target resolves to
    pub fn group_of(&self, target: &str) -> PackageGroup {
        if self.private_packages.contains(target) {
            PackageGroup::Private
        } else {
            PackageGroup::Public
        }
    }

    /// Root directory of the target's package
    pub fn package_root(&self, target: &str) -> PathBuf {
        match self.group_of(target) {
            PackageGroup::Private => self.private_packages_dir.join(target),
            PackageGroup::Public => self.packages_dir.join(target),
        }
    }

    /// Entry module of the target's package
    pub fn entry_path(&self, target: &str) -> PathBuf {
        self.package_root(target).join(&self.entry)
    }

    /// Read the target's `package.json`
    pub fn load_manifest(&self, target: &str) -> Result<PackageManifest> {
        PackageManifest::load(&self.package_root(target).join("package.json"))
    }

    /// Package whose file name the compatibility build reuses
    pub fn primary_package(&self) -> &str {
        &self.primary_package
    }
}

/// Directory names directly under `dir`
fn list_packages(dir: &Path) -> BTreeSet<String> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect()
}

/// Resolve `<package>/package.json` by walking up from `from` through every
/// `node_modules` directory.
pub fn resolve_package_manifest(package: &str, from: &Path) -> Result<PathBuf> {
    let mut current = from.to_path_buf();

    loop {
        let candidate = current
            .join("node_modules")
            .join(package)
            .join("package.json");

        if candidate.is_file() {
            debug!("Resolved {} to {}", package, candidate.display());
            return Ok(candidate);
        }

        if !current.pop() {
            break;
        }
    }

    Err(DevError::PackageNotResolved {
        package: package.to_string(),
        from: from.to_path_buf(),
    })
}
