//! Package manifest (`package.json`) reading

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::{DevError, Result};

/// The parts of a `package.json` the build configuration depends on.
///
/// Dependency maps keep only their names, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub version: String,

    #[serde(default, deserialize_with = "dependency_names")]
    pub dependencies: Vec<String>,

    #[serde(default, deserialize_with = "dependency_names")]
    pub peer_dependencies: Vec<String>,

    #[serde(default, deserialize_with = "dependency_names")]
    pub dev_dependencies: Vec<String>,

    #[serde(default)]
    pub build_options: Option<BuildOptions>,
}

/// `buildOptions` block of a workspace package
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    /// Global variable name for the IIFE build
    #[serde(default)]
    pub name: Option<String>,

    /// Keep Node-only branches in browser-targeted builds
    #[serde(default)]
    pub enable_non_browser_branches: bool,
}

impl PackageManifest {
    /// Read and parse the manifest at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| DevError::ManifestNotFound {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content).map_err(|source| DevError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse manifest JSON
    pub fn parse(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Declared global name, if any
    pub fn global_name(&self) -> Option<&str> {
        self.build_options.as_ref().and_then(|o| o.name.as_deref())
    }

    /// Whether the package opts into Node-only branches
    pub fn enables_non_browser_branches(&self) -> bool {
        self.build_options
            .as_ref()
            .map(|o| o.enable_non_browser_branches)
            .unwrap_or(false)
    }
}

/// Collect the keys of a `{ "name": "range" }` map in document order
fn dependency_names<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Names;

    impl<'de> Visitor<'de> for Names {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of package names to version ranges")
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut names = Vec::new();
            while let Some((name, _)) = map.next_entry::<String, IgnoredAny>()? {
                names.push(name);
            }
            Ok(names)
        }
    }

    deserializer.deserialize_any(Names)
}
