//! File watching for stylesheet hot reload.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, DebouncedEventKind, Debouncer, new_debouncer};

use crate::resolve::StyleEngine;
use crate::{Error, Result};

const TARGET: &str = "xfdashboard_theme::hot_reload";

/// A watched stylesheet file changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetChangeEvent {
    /// Canonical path of the changed file.
    pub path: PathBuf,
    /// What happened to it.
    pub kind: ChangeKind,
}

/// Type of file change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The file was written or replaced.
    Modified,
    /// The file is gone.
    Removed,
}

/// Watches the files behind loaded stylesheets, imports included.
///
/// Parent directories are watched rather than the files themselves so
/// editors that save by renaming keep being noticed.
pub struct StylesheetWatcher {
    debouncer: Debouncer<RecommendedWatcher>,
    rx: Receiver<DebounceEventResult>,
    files: HashSet<PathBuf>,
    dirs: HashSet<PathBuf>,
}

impl StylesheetWatcher {
    /// Create a watcher with a 100ms debounce window.
    pub fn new() -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let debouncer = new_debouncer(Duration::from_millis(100), tx)
            .map_err(|e| Error::HotReload(e.to_string()))?;

        Ok(Self {
            debouncer,
            rx,
            files: HashSet::new(),
            dirs: HashSet::new(),
        })
    }

    /// Start watching one file.
    pub fn watch(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path
            .as_ref()
            .canonicalize()
            .map_err(|e| Error::io(path.as_ref(), e))?;
        if self.files.contains(&path) {
            return Ok(());
        }

        if let Some(dir) = path.parent()
            && !self.dirs.contains(dir)
        {
            self.debouncer
                .watcher()
                .watch(dir, RecursiveMode::NonRecursive)
                .map_err(|e| Error::HotReload(e.to_string()))?;
            self.dirs.insert(dir.to_path_buf());
        }

        tracing::info!(target: TARGET, path = %path.display(), "watching stylesheet");
        self.files.insert(path);
        Ok(())
    }

    /// Watch every file the engine's stylesheets were loaded from that still
    /// exists.
    pub fn watch_engine(&mut self, engine: &StyleEngine) -> Result<()> {
        let files: Vec<PathBuf> = engine
            .stylesheets()
            .iter()
            .flat_map(|sheet| sheet.files.iter().cloned())
            .filter(|file| file.exists())
            .collect();
        for file in files {
            self.watch(file)?;
        }
        Ok(())
    }

    /// Stop watching one file. Unknown paths are ignored.
    pub fn unwatch(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !self.files.remove(&path) {
            return;
        }
        tracing::info!(target: TARGET, path = %path.display(), "stopped watching stylesheet");

        if let Some(dir) = path.parent()
            && !self.files.iter().any(|f| f.parent() == Some(dir))
            && self.dirs.remove(dir)
        {
            let _ = self.debouncer.watcher().unwatch(dir);
        }
    }

    /// Debounced changes to watched files since the last poll, one per file.
    pub fn poll(&mut self) -> Vec<StylesheetChangeEvent> {
        let mut changes = Vec::new();

        loop {
            match self.rx.try_recv() {
                Ok(Ok(events)) => {
                    for event in events {
                        if event.kind != DebouncedEventKind::Any || !self.files.contains(&event.path) {
                            continue;
                        }
                        let kind = if event.path.exists() {
                            ChangeKind::Modified
                        } else {
                            ChangeKind::Removed
                        };
                        changes.push(StylesheetChangeEvent {
                            path: event.path,
                            kind,
                        });
                    }
                }
                Ok(Err(e)) => tracing::warn!(target: TARGET, error = %e, "file watcher error"),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::error!(target: TARGET, "file watcher disconnected");
                    break;
                }
            }
        }

        changes.sort_by(|a, b| a.path.cmp(&b.path));
        changes.dedup_by(|a, b| a.path == b.path);
        changes
    }

    /// Bring the engine up to date with `changes`.
    ///
    /// Every stylesheet that read a changed file is reloaded with its
    /// priority and position kept. A removed top-level file drops its
    /// stylesheet. A stylesheet that fails to reload keeps its previous
    /// rules and the error is logged. Returns the number of stylesheets
    /// replaced or dropped.
    pub fn apply_changes(
        &mut self,
        engine: &mut StyleEngine,
        changes: &[StylesheetChangeEvent],
    ) -> Result<usize> {
        let mut reload: Vec<PathBuf> = Vec::new();
        let mut remove: Vec<PathBuf> = Vec::new();

        for change in changes {
            for sheet in engine.stylesheets() {
                let Some(path) = &sheet.path else { continue };
                if !sheet.depends_on(&change.path) {
                    continue;
                }
                let own_file = sheet.files.first() == Some(&change.path);
                let target = if change.kind == ChangeKind::Removed && own_file {
                    self.unwatch(&change.path);
                    &mut remove
                } else {
                    &mut reload
                };
                if !target.contains(path) {
                    target.push(path.clone());
                }
            }
        }
        reload.retain(|path| !remove.contains(path));

        let mut applied = 0;
        for path in &remove {
            tracing::info!(target: TARGET, path = %path.display(), "stylesheet removed");
            if engine.remove_stylesheet(path) {
                applied += 1;
            }
        }
        for path in &reload {
            match engine.reload_stylesheet(path) {
                Ok(true) => applied += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(target: TARGET, path = %path.display(), error = %e, "keeping previous stylesheet");
                }
            }
        }

        self.watch_engine(engine)?;
        Ok(applied)
    }

    /// Number of watched files.
    pub fn watched_count(&self) -> usize {
        self.files.len()
    }

    /// The watched files.
    pub fn watched_paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tempfile::tempdir;

    fn event(path: &Path, kind: ChangeKind) -> StylesheetChangeEvent {
        StylesheetChangeEvent {
            path: path.canonicalize().unwrap_or_else(|_| path.to_path_buf()),
            kind,
        }
    }

    #[test]
    fn watches_engine_files_once() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("base.css"), ".b { p: 1; }").unwrap();
        fs::write(dir.path().join("main.css"), "@import(base.css);").unwrap();

        let mut engine = StyleEngine::default();
        engine.load_stylesheet(&dir.path().join("main.css"), 0).unwrap();

        let mut watcher = StylesheetWatcher::new().unwrap();
        watcher.watch_engine(&engine).unwrap();
        watcher.watch(dir.path().join("base.css")).unwrap();
        assert_eq!(watcher.watched_count(), 2);

        watcher.unwatch(dir.path().join("base.css"));
        watcher.unwatch(dir.path().join("unknown.css"));
        assert_eq!(watcher.watched_count(), 1);
    }

    #[test]
    fn import_change_reloads_importer() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("base.css");
        let main = dir.path().join("main.css");
        fs::write(&base, ".b { p: 1; }").unwrap();
        fs::write(&main, "@import(base.css);\n.m { p: 2; }").unwrap();

        let mut engine = StyleEngine::default();
        engine.load_stylesheet(&main, 4).unwrap();
        let mut watcher = StylesheetWatcher::new().unwrap();
        watcher.watch_engine(&engine).unwrap();

        fs::write(&base, ".b { p: 1; }\n.c { p: 3; }").unwrap();
        let applied = watcher
            .apply_changes(&mut engine, &[event(&base, ChangeKind::Modified)])
            .unwrap();
        assert_eq!(applied, 1);
        assert_eq!(engine.rule_count(), 3);
        assert_eq!(engine.stylesheets()[0].priority, 4);
    }

    #[test]
    fn broken_edit_keeps_previous_rules() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("main.css");
        fs::write(&main, ".m { p: 2; }").unwrap();

        let mut engine = StyleEngine::default();
        engine.load_stylesheet(&main, 0).unwrap();
        let mut watcher = StylesheetWatcher::new().unwrap();

        fs::write(&main, ".m { p: 2 }").unwrap();
        let applied = watcher
            .apply_changes(&mut engine, &[event(&main, ChangeKind::Modified)])
            .unwrap();
        assert_eq!(applied, 0);
        assert_eq!(engine.rule_count(), 1);
    }

    #[test]
    fn removed_stylesheet_is_dropped() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("main.css");
        fs::write(&main, ".m { p: 2; }").unwrap();

        let mut engine = StyleEngine::default();
        engine.load_stylesheet(&main, 0).unwrap();
        let mut watcher = StylesheetWatcher::new().unwrap();
        watcher.watch_engine(&engine).unwrap();
        let removed = event(&main, ChangeKind::Removed);

        fs::remove_file(&main).unwrap();
        assert_eq!(watcher.apply_changes(&mut engine, &[removed]).unwrap(), 1);
        assert!(engine.stylesheets().is_empty());
        assert_eq!(watcher.watched_count(), 0);
    }
}
