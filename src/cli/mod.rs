//! Command-line interface for devbuild
//!
//! `devbuild [targets..] [-f format] [-p] [-i]` resolves one build per target
//! and keeps every one of them rebuilding until interrupted.

mod dev;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::build::BuildRequest;

pub use dev::run;

/// Watch-mode development builds for workspace packages
#[derive(Parser, Debug)]
#[command(name = "devbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Packages to build
    #[arg(default_value = "vue")]
    pub targets: Vec<String>,

    /// Format tag: global, cjs, esm-bundler, esm-browser, optionally with -runtime
    #[arg(short, long, default_value = "global")]
    pub format: String,

    /// Build with __DEV__ disabled and a .prod. file name
    #[arg(short, long)]
    pub prod: bool,

    /// Bundle dependencies instead of leaving them external
    #[arg(short, long)]
    pub inline: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to devbuild.toml, relative to the workspace root
    #[arg(short, long, default_value = "devbuild.toml")]
    pub config: PathBuf,

    /// Workspace root (defaults to the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// esbuild binary, overrides the config file
    #[arg(long, env = "ESBUILD_BINARY_PATH")]
    pub esbuild: Option<PathBuf>,
}

impl Cli {
    /// One build request per target, in the order given
    pub fn requests(&self) -> Vec<BuildRequest> {
        self.targets
            .iter()
            .map(|target| BuildRequest::new(target, &self.format, self.prod, self.inline))
            .collect()
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        print_banner();
        run(self).await
    }
}

/// Print the devbuild banner
fn print_banner() {
    eprintln!(
        "\n{} {} {}\n",
        "⚡".cyan(),
        "devbuild".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
