//! Bundling engine boundary
//!
//! A [`BundleEngine`] opens one [`BuildContext`] per target. The context owns
//! its engine session and, once told to watch, rebuilds whenever one of the
//! bundle's inputs changes until shutdown is signalled.

mod esbuild;
mod watcher;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;

use crate::build::{DefineMap, OutputFormat, Platform, ResolvedBuild};
use crate::plugins::PluginManager;

pub use esbuild::{EsbuildContext, EsbuildEngine};
pub use watcher::InputWatcher;

/// Receiving end of a shutdown signal; `true` means stop
pub type Shutdown = watch::Receiver<bool>;

/// Options for one engine session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub entry: PathBuf,
    pub outfile: PathBuf,
    pub bundle: bool,
    pub sourcemap: bool,
    pub format: OutputFormat,
    pub platform: Platform,
    pub global_name: Option<String>,
    pub externals: Vec<String>,
    pub defines: DefineMap,
}

impl From<&ResolvedBuild> for EngineOptions {
    fn from(build: &ResolvedBuild) -> Self {
        Self {
            entry: build.entry.clone(),
            outfile: build.outfile.clone(),
            bundle: true,
            sourcemap: true,
            format: build.output_format,
            platform: build.platform,
            global_name: build.global_name.clone(),
            externals: build.externals.clone(),
            defines: build.defines.clone(),
        }
    }
}

/// Result of a single build
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// Whether the engine produced the bundle
    pub success: bool,

    /// Wall time of the build
    pub duration: Duration,

    /// Absolute paths of every module that went into the bundle
    pub inputs: Vec<PathBuf>,
}

/// Something that can open incremental build sessions
#[async_trait]
pub trait BundleEngine: Send + Sync {
    /// Open a build context; no build runs until [`BuildContext::watch`]
    async fn context(
        &self,
        options: EngineOptions,
        plugins: PluginManager,
    ) -> Result<Box<dyn BuildContext>>;
}

/// A long-lived engine session
#[async_trait]
pub trait BuildContext: Send {
    /// Build once, then rebuild on every relevant change until `shutdown`
    /// flips to `true`. Failed builds do not end the session.
    async fn watch(&mut self, shutdown: Shutdown) -> Result<()>;
}

/// Resolves once shutdown is requested. A dropped sender can never request
/// it, so this then never resolves.
pub async fn shutdown_requested(shutdown: &mut Shutdown) {
    loop {
        let stop = *shutdown.borrow_and_update();
        if stop {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
