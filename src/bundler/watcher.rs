//! Input-scoped file watching
//!
//! Watches the directories holding a bundle's inputs and reports debounced
//! changes. The watch set follows the inputs of the latest successful build;
//! while a build is broken a whole source tree can be watched as well.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::error::Result;

/// File watcher scoped to a set of input files
pub struct InputWatcher {
    debouncer: Debouncer<RecommendedWatcher>,
    inputs: HashSet<PathBuf>,
    /// Watched directory and whether it is watched recursively
    watched: BTreeMap<PathBuf, bool>,
    tree: Option<PathBuf>,
}

impl InputWatcher {
    /// Create a watcher and the channel its changed paths arrive on
    pub fn new(debounce: Duration) -> Result<(Self, mpsc::UnboundedReceiver<Vec<PathBuf>>)> {
        let (tx, rx) = mpsc::unbounded_channel();

        let debouncer = new_debouncer(debounce, move |result: DebounceEventResult| match result {
            Ok(events) => {
                let paths: Vec<PathBuf> = events.into_iter().map(|event| event.path).collect();
                // Receiver gone means the session ended
                let _ = tx.send(paths);
            }
            Err(e) => {
                error!("Watch error: {:?}", e);
            }
        })?;

        Ok((
            Self {
                debouncer,
                inputs: HashSet::new(),
                watched: BTreeMap::new(),
                tree: None,
            },
            rx,
        ))
    }

    /// Replace the watched inputs, attaching and detaching directories as
    /// needed. With `tree`, everything below it is watched too and any change
    /// in a watched directory counts as relevant.
    pub fn sync(&mut self, inputs: &[PathBuf], tree: Option<&Path>) -> Result<()> {
        let mut wanted: BTreeMap<PathBuf, bool> = parent_dirs(inputs)
            .into_iter()
            .filter(|dir| tree.map_or(true, |tree| !dir.starts_with(tree)))
            .map(|dir| (dir, false))
            .collect();
        if let Some(tree) = tree.filter(|tree| tree.is_dir()) {
            wanted.insert(tree.to_path_buf(), true);
        }

        for (dir, recursive) in &self.watched {
            if wanted.get(dir) != Some(recursive) {
                if let Err(e) = self.debouncer.watcher().unwatch(dir) {
                    debug!("Failed to unwatch {}: {}", dir.display(), e);
                }
            }
        }

        for (dir, &recursive) in &wanted {
            if self.watched.get(dir) == Some(&recursive) {
                continue;
            }
            let mode = if recursive {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            if let Err(e) = self.debouncer.watcher().watch(dir, mode) {
                warn!("Cannot watch {}: {}", dir.display(), e);
            }
        }

        debug!(
            "Watching {} input(s) in {} dir(s){}",
            inputs.len(),
            wanted.len(),
            if tree.is_some() { " until the next good build" } else { "" }
        );

        self.inputs = inputs.iter().cloned().collect();
        self.watched = wanted;
        self.tree = tree.map(Path::to_path_buf);

        Ok(())
    }

    /// Whether any changed path should trigger a rebuild
    pub fn is_relevant(&self, changed: &[PathBuf]) -> bool {
        changed.iter().any(|path| {
            if self.inputs.contains(path) {
                return true;
            }
            match &self.tree {
                Some(tree) => {
                    path.starts_with(tree)
                        || path
                            .parent()
                            .is_some_and(|dir| self.watched.contains_key(dir))
                }
                None => false,
            }
        })
    }
}

/// Existing parent directories of the given files
fn parent_dirs(files: &[PathBuf]) -> BTreeSet<PathBuf> {
    files
        .iter()
        .filter_map(|file| file.parent())
        .filter(|dir| dir.is_dir())
        .map(Path::to_path_buf)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parent_dirs_skip_missing() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            dir.path().join("a.ts"),
            dir.path().join("b.ts"),
            dir.path().join("missing/c.ts"),
        ];

        let dirs = parent_dirs(&files);
        assert_eq!(dirs.len(), 1);
        assert!(dirs.contains(dir.path()));
    }

    #[tokio::test]
    async fn test_sync_tracks_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("index.ts");
        fs::write(&input, "export {}").unwrap();

        let (mut watcher, _rx) = InputWatcher::new(Duration::from_millis(20)).unwrap();
        watcher.sync(&[input.clone()], None).unwrap();

        assert!(watcher.is_relevant(&[input.clone()]));
        assert!(!watcher.is_relevant(&[dir.path().join("other.ts")]));

        watcher.sync(&[], None).unwrap();
        assert!(!watcher.is_relevant(&[input]));
    }

    #[tokio::test]
    async fn test_tree_makes_any_change_relevant() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        let entry = src.join("index.ts");
        fs::write(&entry, "export {}").unwrap();

        let (mut watcher, _rx) = InputWatcher::new(Duration::from_millis(20)).unwrap();
        watcher.sync(&[entry.clone()], Some(&src)).unwrap();

        assert!(watcher.is_relevant(&[src.join("dep.ts")]));
        assert!(watcher.is_relevant(&[src.join("nested/util.ts")]));
        assert!(!watcher.is_relevant(&[dir.path().join("README.md")]));

        // Back to exact inputs once a build succeeds
        watcher.sync(&[entry.clone()], None).unwrap();
        assert!(watcher.is_relevant(&[entry]));
        assert!(!watcher.is_relevant(&[src.join("dep.ts")]));
    }
}
