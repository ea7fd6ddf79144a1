//! devbuild library
//!
//! Build configuration resolution and watch sessions for the devbuild CLI.

pub mod build;
pub mod bundler;
pub mod cli;
pub mod config;
pub mod error;
pub mod plugins;
pub mod resolver;
pub mod session;
pub mod utils;

pub use build::{resolve_build, BuildRequest, ResolvedBuild};
pub use bundler::{BundleEngine, EsbuildEngine};
pub use cli::Cli;
pub use config::Config;
pub use error::DevError;
pub use resolver::Workspace;
