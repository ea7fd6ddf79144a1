//! Watch command implementation

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use futures_util::future::try_join_all;
use tokio::sync::watch;
use tracing::info;

use super::Cli;
use crate::build::resolve_build;
use crate::bundler::{BundleEngine, EsbuildEngine};
use crate::config::Config;
use crate::resolver::Workspace;
use crate::session::spawn_all;

/// Resolve every target, then watch them all until Ctrl+C
pub async fn run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let root = cli.root.clone().unwrap_or_else(|| cwd.clone());
    let root = root
        .canonicalize()
        .with_context(|| format!("Workspace root not found: {}", root.display()))?;

    info!("Loading configuration from {}", cli.config.display());
    let mut config = Config::load(&root, &cli.config)?;
    if let Some(esbuild) = &cli.esbuild {
        config.engine.esbuild = esbuild.clone();
    }

    let workspace = Workspace::discover(&config);

    // Every target must resolve before any session opens
    let builds = cli
        .requests()
        .into_iter()
        .map(|request| resolve_build(&workspace, request))
        .collect::<crate::error::Result<Vec<_>>>()?;

    eprintln!("{} Watching {} target(s)", "→".blue(), builds.len());

    let engine: Arc<dyn BundleEngine> = Arc::new(EsbuildEngine::from_config(&config));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handles = spawn_all(engine, builds, &cwd, shutdown_rx);

    eprintln!("\n  {} Press {} to stop\n", "•".dimmed(), "Ctrl+C".yellow());

    let sessions = try_join_all(handles.into_iter().map(|handle| async move {
        handle.await.context("Watch session panicked")?
    }));
    tokio::pin!(sessions);

    tokio::select! {
        result = &mut sessions => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Stopping watch sessions");
            let _ = shutdown_tx.send(true);
            sessions.await?;
        }
    }

    Ok(())
}
