//! Plugin system for devbuild
//!
//! Plugins ride along with a build session: they can contribute module
//! aliases to the engine and get notified around every (re)build.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use colored::Colorize;

use crate::bundler::BuildOutcome;
use crate::utils::{relative_path, slash_path};

/// Plugin hook context
pub struct PluginContext {
    /// Output file of the session the plugin is installed in
    pub outfile: PathBuf,
}

/// Plugin trait - implement this to hook into a build session
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Plugin name for logging and debugging
    fn name(&self) -> &str;

    /// Module aliases this plugin asks the engine to apply
    fn aliases(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Called before every build
    async fn build_start(&self, _ctx: &PluginContext) -> Result<()> {
        Ok(())
    }

    /// Called after every build, successful or not
    async fn build_end(&self, _outcome: &BuildOutcome, _ctx: &PluginContext) -> Result<()> {
        Ok(())
    }
}

/// Plugin manager
pub struct PluginManager {
    plugins: Vec<Arc<dyn Plugin>>,
    context: PluginContext,
}

impl PluginManager {
    /// Create a new plugin manager
    pub fn new(outfile: PathBuf) -> Self {
        Self {
            plugins: Vec::new(),
            context: PluginContext { outfile },
        }
    }

    /// Register a plugin
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Names of the registered plugins, in order
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Aliases from every plugin, in registration order
    pub fn aliases(&self) -> Vec<(String, String)> {
        self.plugins.iter().flat_map(|p| p.aliases()).collect()
    }

    /// Run build_start hooks
    pub async fn run_build_start(&self) -> Result<()> {
        for plugin in &self.plugins {
            plugin.build_start(&self.context).await?;
        }
        Ok(())
    }

    /// Run build_end hooks
    pub async fn run_build_end(&self, outcome: &BuildOutcome) -> Result<()> {
        for plugin in &self.plugins {
            plugin.build_end(outcome, &self.context).await?;
        }
        Ok(())
    }
}

/// Prints `built: <path>` after every successful build, with the output
/// path shown relative to `cwd`.
///
/// Failed builds stay silent here; the engine prints its own diagnostics.
pub struct LogRebuildPlugin {
    cwd: PathBuf,
}

impl LogRebuildPlugin {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    /// The line printed for a finished build of `outfile`
    pub fn message(&self, outfile: &Path) -> String {
        let shown = relative_path(&self.cwd, outfile).unwrap_or_else(|| slash_path(outfile));
        format!("built: {}", shown)
    }
}

#[async_trait]
impl Plugin for LogRebuildPlugin {
    fn name(&self) -> &str {
        "log-rebuild"
    }

    async fn build_end(&self, outcome: &BuildOutcome, ctx: &PluginContext) -> Result<()> {
        if outcome.success {
            println!("{}", self.message(&ctx.outfile).green());
        }
        Ok(())
    }
}

/// Node built-ins that get a browser implementation
const NODE_BUILTINS: [&str; 14] = [
    "assert",
    "buffer",
    "crypto",
    "events",
    "fs",
    "os",
    "path",
    "process",
    "querystring",
    "stream",
    "string_decoder",
    "url",
    "util",
    "vm",
];

/// Lets browser-targeted builds reference Node built-ins by aliasing them to
/// the `@jspm/core` browser implementations.
pub struct PolyfillNodePlugin {
    polyfill_root: String,
}

impl PolyfillNodePlugin {
    pub fn new() -> Self {
        Self {
            polyfill_root: "@jspm/core/nodelibs/browser".to_string(),
        }
    }
}

impl Default for PolyfillNodePlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for PolyfillNodePlugin {
    fn name(&self) -> &str {
        "polyfill-node"
    }

    fn aliases(&self) -> Vec<(String, String)> {
        NODE_BUILTINS
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    format!("{}/{}", self.polyfill_root, name),
                )
            })
            .collect()
    }
}
