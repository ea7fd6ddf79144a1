//! Watch sessions
//!
//! Each requested target gets its own task owning one engine context for the
//! life of the process. Sessions are started in request order without waiting
//! on each other and share no mutable state.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::build::ResolvedBuild;
use crate::bundler::{BundleEngine, EngineOptions, Shutdown};
use crate::plugins::{LogRebuildPlugin, PluginManager, PolyfillNodePlugin};

/// Plugins for one build: the rebuild logger always, the Node polyfill when
/// the build asks for it
pub fn plugins_for(build: &ResolvedBuild, cwd: &Path) -> PluginManager {
    let mut plugins = PluginManager::new(build.outfile.clone());
    plugins.register(Arc::new(LogRebuildPlugin::new(cwd)));

    if build.polyfill_node {
        plugins.register(Arc::new(PolyfillNodePlugin::new()));
    }

    plugins
}

/// Open a watch session for `build` on its own task
pub fn spawn_session(
    engine: Arc<dyn BundleEngine>,
    build: ResolvedBuild,
    cwd: &Path,
    shutdown: Shutdown,
) -> JoinHandle<Result<()>> {
    let plugins = plugins_for(&build, cwd);

    eprintln!(
        "  {} {} {}{}",
        "•".dimmed(),
        build.target().cyan(),
        build.request.format.as_str(),
        if build.request.production {
            " (prod)".yellow().to_string()
        } else {
            String::new()
        }
    );
    debug!(
        "{}: {} externals, {} defines, plugins {:?}",
        build.target(),
        build.externals.len(),
        build.defines.len(),
        plugins.names()
    );

    tokio::spawn(async move {
        let options = EngineOptions::from(&build);
        let mut context = engine
            .context(options, plugins)
            .await
            .with_context(|| format!("Failed to open build context for {}", build.target()))?;

        context.watch(shutdown).await
    })
}

/// Open one session per build, in order
pub fn spawn_all(
    engine: Arc<dyn BundleEngine>,
    builds: Vec<ResolvedBuild>,
    cwd: &Path,
    shutdown: Shutdown,
) -> Vec<JoinHandle<Result<()>>> {
    builds
        .into_iter()
        .map(|build| spawn_session(engine.clone(), build, cwd, shutdown.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildRequest;
    use crate::bundler::{shutdown_requested, BuildContext, BuildOutcome};
    use crate::resolver::PackageManifest;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::watch;

    /// Values recorded from concurrently running sessions
    struct Recorded<T>(Mutex<Vec<T>>);

    impl<T> Default for Recorded<T> {
        fn default() -> Self {
            Self(Mutex::new(Vec::new()))
        }
    }

    impl<T: Clone> Recorded<T> {
        fn push(&self, value: T) {
            self.0.lock().unwrap().push(value);
        }

        fn all(&self) -> Vec<T> {
            self.0.lock().unwrap().clone()
        }
    }

    #[derive(Default)]
    struct FakeEngine {
        opened: Recorded<PathBuf>,
        plugins: Recorded<Vec<String>>,
    }

    struct FakeContext {
        plugins: PluginManager,
    }

    #[async_trait]
    impl BundleEngine for FakeEngine {
        async fn context(
            &self,
            options: EngineOptions,
            plugins: PluginManager,
        ) -> Result<Box<dyn BuildContext>> {
            self.opened.push(options.outfile.clone());
            self.plugins
                .push(plugins.names().into_iter().map(str::to_string).collect());
            Ok(Box::new(FakeContext { plugins }))
        }
    }

    #[async_trait]
    impl BuildContext for FakeContext {
        async fn watch(&mut self, mut shutdown: Shutdown) -> Result<()> {
            let outcome = BuildOutcome {
                success: true,
                duration: Duration::from_millis(1),
                inputs: Vec::new(),
            };
            self.plugins.run_build_start().await?;
            self.plugins.run_build_end(&outcome).await?;
            shutdown_requested(&mut shutdown).await;
            Ok(())
        }
    }

    fn build(target: &str, format: &str, manifest: &str) -> ResolvedBuild {
        let root = PathBuf::from("/ws/packages").join(target);
        ResolvedBuild::from_parts(
            BuildRequest::new(target, format, false, false),
            &root,
            root.join("src/index.ts"),
            "vue",
            &PackageManifest::parse(manifest).unwrap(),
            &[],
        )
    }

    #[test]
    fn test_plugins_for_browser_build() {
        let plugins = plugins_for(
            &build(
                "compiler-sfc",
                "esm-browser",
                r#"{ "version": "1.0.0", "buildOptions": { "enableNonBrowserBranches": true } }"#,
            ),
            Path::new("/ws"),
        );
        assert_eq!(plugins.names(), vec!["log-rebuild", "polyfill-node"]);
    }

    #[test]
    fn test_plugins_for_cjs_build() {
        let plugins = plugins_for(
            &build(
                "compiler-sfc",
                "cjs",
                r#"{ "version": "1.0.0", "buildOptions": { "enableNonBrowserBranches": true } }"#,
            ),
            Path::new("/ws"),
        );
        assert_eq!(plugins.names(), vec!["log-rebuild"]);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let engine = Arc::new(FakeEngine::default());
        let (tx, rx) = watch::channel(false);

        let handles = spawn_all(
            engine.clone(),
            vec![
                build("reactivity", "esm-bundler", r#"{ "version": "1.0.0" }"#),
                build("shared", "cjs", r#"{ "version": "1.0.0" }"#),
            ],
            Path::new("/ws"),
            rx,
        );
        assert_eq!(handles.len(), 2);

        // Both sessions stay open until told to stop
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(handles.iter().all(|h| !h.is_finished()));

        tx.send(true).unwrap();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut opened = engine.opened.all();
        opened.sort();
        assert_eq!(
            opened,
            vec![
                PathBuf::from("/ws/packages/reactivity/dist/reactivity.esm-bundler.js"),
                PathBuf::from("/ws/packages/shared/dist/shared.cjs.js"),
            ]
        );
        assert!(engine
            .plugins
            .all()
            .iter()
            .all(|names| names == &vec!["log-rebuild".to_string()]));
    }
}
