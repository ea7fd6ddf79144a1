//! devbuild - watch-mode development builds for multi-package workspaces
//!
//! Resolves per-package bundle settings (module format, externals,
//! compile-time constants) and keeps one esbuild session per requested
//! package rebuilding on change.
//!
//! # Usage
//! - `devbuild` watches `vue` as a global build
//! - `devbuild reactivity shared -f esm-bundler` watches two packages
//! - `devbuild vue-compat -p` writes `vue.global.prod.js` for the compat build

use anyhow::Result;
use clap::Parser;
use devbuild_lib::Cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging/tracing system
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("devbuild_lib=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("devbuild_lib=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    cli.execute().await
}
