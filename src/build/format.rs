//! Format tags and the engine settings derived from them

use std::fmt;

const RUNTIME_SUFFIX: &str = "-runtime";

/// A format tag such as `global`, `cjs`, `esm-bundler` or `esm-browser-runtime`.
///
/// Unknown tags are kept verbatim. They are neither `cjs` nor `global` nor
/// an ESM variant, so every rule treats them like a browser ESM build.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Format(String);

impl Format {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exactly `cjs`
    pub fn is_cjs(&self) -> bool {
        self.0 == "cjs"
    }

    /// Exactly `global`; `global-runtime` does not count
    pub fn is_global(&self) -> bool {
        self.0 == "global"
    }

    pub fn is_esm_bundler(&self) -> bool {
        self.0.contains("esm-bundler")
    }

    pub fn is_esm_browser(&self) -> bool {
        self.0.contains("esm-browser")
    }

    /// Formats consumed by a downstream bundler or Node keep their
    /// dependencies external
    pub fn externalizes_dependencies(&self) -> bool {
        self.is_cjs() || self.is_esm_bundler()
    }

    /// Module format handed to the engine
    pub fn output_format(&self) -> OutputFormat {
        if self.0.starts_with("global") {
            OutputFormat::Iife
        } else if self.is_cjs() {
            OutputFormat::Cjs
        } else {
            OutputFormat::Esm
        }
    }

    /// File name postfix: `esm-bundler-runtime` becomes `runtime.esm-bundler`
    pub fn postfix(&self) -> String {
        match self.0.strip_suffix(RUNTIME_SUFFIX) {
            Some(stem) => format!("runtime.{}", stem),
            None => self.0.clone(),
        }
    }

    /// Engine platform: only `cjs` targets Node
    pub fn platform(&self) -> Platform {
        if self.is_cjs() {
            Platform::Node
        } else {
            Platform::Browser
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Self::new("global")
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Format {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Module system of the emitted bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Iife,
    Cjs,
    Esm,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Iife => "iife",
            OutputFormat::Cjs => "cjs",
            OutputFormat::Esm => "esm",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Environment the engine resolves built-ins for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Browser,
    Node,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Browser => "browser",
            Platform::Node => "node",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
