//! esbuild-backed engine
//!
//! Runs the esbuild binary once per build cycle and reads the metafile it
//! writes to learn the bundle's inputs, which then drive [`InputWatcher`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{
    shutdown_requested, BuildContext, BuildOutcome, BundleEngine, EngineOptions, InputWatcher,
    Shutdown,
};
use crate::config::Config;
use crate::error::DevError;
use crate::plugins::PluginManager;
use crate::utils::{format_duration, relative_path};

/// Engine that shells out to esbuild
#[derive(Debug, Clone)]
pub struct EsbuildEngine {
    program: PathBuf,
    workdir: PathBuf,
    log_level: String,
    debounce: Duration,
}

impl EsbuildEngine {
    pub fn new(program: PathBuf, workdir: PathBuf) -> Self {
        Self {
            program,
            workdir,
            log_level: "warning".to_string(),
            debounce: Duration::from_millis(100),
        }
    }

    /// Engine configured from `[engine]` in devbuild.toml
    pub fn from_config(config: &Config) -> Self {
        Self {
            program: config.esbuild_path(),
            workdir: config.root.clone(),
            log_level: config.engine.log_level.clone(),
            debounce: Duration::from_millis(config.engine.debounce_ms),
        }
    }
}

#[async_trait]
impl BundleEngine for EsbuildEngine {
    async fn context(
        &self,
        options: EngineOptions,
        plugins: PluginManager,
    ) -> Result<Box<dyn BuildContext>> {
        Ok(Box::new(EsbuildContext::new(self.clone(), options, plugins)))
    }
}

/// One esbuild session
pub struct EsbuildContext {
    engine: EsbuildEngine,
    options: EngineOptions,
    plugins: PluginManager,
    metafile: PathBuf,
    args: Vec<String>,
}

impl EsbuildContext {
    fn new(engine: EsbuildEngine, options: EngineOptions, plugins: PluginManager) -> Self {
        let metafile = metafile_path(&options.outfile);
        let args = command_args(&options, &plugins.aliases(), &metafile, &engine.log_level);

        Self {
            engine,
            options,
            plugins,
            metafile,
            args,
        }
    }

    /// Run one build and report what went in
    async fn build(&self) -> Result<BuildOutcome> {
        self.plugins.run_build_start().await?;

        let start = Instant::now();
        let status = Command::new(&self.engine.program)
            .args(&self.args)
            .current_dir(&self.engine.workdir)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|source| DevError::EngineSpawn {
                program: self.engine.program.clone(),
                source,
            })?;
        let duration = start.elapsed();

        let inputs = if status.success() {
            read_metafile_inputs(&self.metafile, &self.engine.workdir)
        } else {
            Vec::new()
        };

        let outcome = BuildOutcome {
            success: status.success(),
            duration,
            inputs,
        };

        debug!(
            "esbuild {} for {} in {}",
            if outcome.success { "succeeded" } else { "failed" },
            self.options.outfile.display(),
            format_duration(outcome.duration)
        );

        self.plugins.run_build_end(&outcome).await?;

        Ok(outcome)
    }

    /// Inputs to watch after a build. Failed builds keep the previous set,
    /// and the entry is always included.
    fn watch_set(&self, outcome: &BuildOutcome, previous: &[PathBuf]) -> Vec<PathBuf> {
        let mut inputs = if outcome.success {
            outcome.inputs.clone()
        } else {
            previous.to_vec()
        };
        if !inputs.contains(&self.options.entry) {
            inputs.push(self.options.entry.clone());
        }
        inputs
    }

    /// Point the watcher at `inputs`. After a failed build the entry's whole
    /// source tree is watched as well, so fixing or creating any module there
    /// triggers the retry.
    fn rewatch(
        &self,
        watcher: &mut InputWatcher,
        outcome: &BuildOutcome,
        inputs: &[PathBuf],
    ) -> Result<()> {
        let tree = if outcome.success {
            None
        } else {
            self.options.entry.parent()
        };
        watcher.sync(inputs, tree)?;
        Ok(())
    }
}

#[async_trait]
impl BuildContext for EsbuildContext {
    async fn watch(&mut self, mut shutdown: Shutdown) -> Result<()> {
        let (mut watcher, mut changes) = InputWatcher::new(self.engine.debounce)?;

        let outcome = self.build().await?;
        let mut inputs = self.watch_set(&outcome, &[]);
        self.rewatch(&mut watcher, &outcome, &inputs)?;

        loop {
            tokio::select! {
                _ = shutdown_requested(&mut shutdown) => {
                    info!("Stopped watching {}", self.options.entry.display());
                    break;
                }
                changed = changes.recv() => {
                    let Some(paths) = changed else {
                        warn!("File watcher for {} closed", self.options.entry.display());
                        break;
                    };

                    if !watcher.is_relevant(&paths) {
                        continue;
                    }

                    if let Some(path) = paths.first() {
                        debug!(
                            "Change in {}",
                            relative_path(&self.engine.workdir, path).unwrap_or_default()
                        );
                    }

                    // One save can arrive as several batches
                    tokio::time::sleep(self.engine.debounce * 2).await;
                    while changes.try_recv().is_ok() {}

                    let outcome = self.build().await?;
                    inputs = self.watch_set(&outcome, &inputs);
                    self.rewatch(&mut watcher, &outcome, &inputs)?;
                }
            }
        }

        let _ = fs::remove_file(&self.metafile);

        Ok(())
    }
}

/// Translate engine options into esbuild flags
pub fn command_args(
    options: &EngineOptions,
    aliases: &[(String, String)],
    metafile: &Path,
    log_level: &str,
) -> Vec<String> {
    let mut args = vec![options.entry.display().to_string()];

    if options.bundle {
        args.push("--bundle".to_string());
    }
    args.push(format!("--outfile={}", options.outfile.display()));
    if options.sourcemap {
        args.push("--sourcemap".to_string());
    }
    args.push(format!("--format={}", options.format));
    args.push(format!("--platform={}", options.platform));

    if let Some(name) = &options.global_name {
        args.push(format!("--global-name={}", name));
    }

    for external in &options.externals {
        args.push(format!("--external:{}", external));
    }

    for (name, value) in options.defines.iter() {
        args.push(format!("--define:{}={}", name, value));
    }

    for (from, to) in aliases {
        args.push(format!("--alias:{}={}", from, to));
    }

    args.push(format!("--metafile={}", metafile.display()));
    args.push(format!("--log-level={}", log_level));

    args
}

/// Per-session metafile location, unique per package, output file and process
fn metafile_path(outfile: &Path) -> PathBuf {
    let name = outfile
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bundle".to_string());
    // {package}/dist/{name}
    let package = outfile
        .parent()
        .and_then(Path::parent)
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    std::env::temp_dir().join(format!(
        "devbuild-{}-{}-{}.meta.json",
        std::process::id(),
        package,
        name
    ))
}

#[derive(Deserialize)]
struct Metafile {
    #[serde(default)]
    inputs: BTreeMap<String, serde::de::IgnoredAny>,
}

/// Absolute input paths listed in an esbuild metafile
fn read_metafile_inputs(metafile: &Path, workdir: &Path) -> Vec<PathBuf> {
    let content = match fs::read_to_string(metafile) {
        Ok(content) => content,
        Err(e) => {
            warn!("Cannot read metafile {}: {}", metafile.display(), e);
            return Vec::new();
        }
    };

    parse_metafile_inputs(&content, workdir)
}

fn parse_metafile_inputs(content: &str, workdir: &Path) -> Vec<PathBuf> {
    match serde_json::from_str::<Metafile>(content) {
        Ok(meta) => meta
            .inputs
            .into_keys()
            .map(|input| workdir.join(input))
            .collect(),
        Err(e) => {
            warn!("Malformed esbuild metafile: {}", e);
            Vec::new()
        }
    }
}
