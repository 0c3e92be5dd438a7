//! Theme directories.
//!
//! A theme is a directory holding a [`theme.toml`](ThemeManifest) manifest
//! and the stylesheets it lists. Installed themes live in
//! `<data dir>/themes/<name>/xfdashboard-1.0/`.

mod config;

use std::path::{Path, PathBuf};

pub use config::{MANIFEST_FILE, ThemeManifest};

use crate::resolve::{EngineOptions, StyleEngine};
use crate::{Error, Result};

/// Subdirectory of an installed theme holding the dashboard's files.
pub const THEME_SUBDIR: &str = "xfdashboard-1.0";

/// A loaded theme: its manifest plus an engine holding its stylesheets.
#[derive(Debug)]
pub struct Theme {
    dir: PathBuf,
    manifest: ThemeManifest,
    engine: StyleEngine,
}

impl Theme {
    /// Load the theme in `dir` with the built-in converters and functions.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(dir, EngineOptions::default())
    }

    /// Load the theme in `dir`.
    ///
    /// The theme directory, icon theme and recursion limit of `options` are
    /// taken from the manifest. Each stylesheet gets its index in the
    /// manifest as priority, so later sheets win ties.
    pub fn load_with(dir: impl AsRef<Path>, mut options: EngineOptions) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let manifest = ThemeManifest::load(&dir.join(MANIFEST_FILE))?;

        options.theme_dir = Some(dir.clone());
        if manifest.icon_theme.is_some() {
            options.icon_theme = manifest.icon_theme.clone();
        }
        if let Some(limit) = manifest.recursion_limit {
            options.recursion_limit = limit;
        }

        let mut engine = StyleEngine::new(options);
        for (index, sheet) in manifest.stylesheets.iter().enumerate() {
            let priority = i32::try_from(index).unwrap_or(i32::MAX);
            engine.load_stylesheet(&dir.join(sheet), priority)?;
        }

        tracing::info!(
            target: "xfdashboard_theme::parser",
            theme = %manifest.name,
            dir = %dir.display(),
            stylesheets = manifest.stylesheets.len(),
            rules = engine.rule_count(),
            "loaded theme"
        );
        Ok(Self {
            dir,
            manifest,
            engine,
        })
    }

    /// Find and load the installed theme called `name`.
    pub fn find(name: &str) -> Result<Self> {
        Self::find_in(name, &default_theme_paths())
    }

    /// Find and load the theme called `name` under the first of
    /// `search_paths` that has it.
    pub fn find_in(name: &str, search_paths: &[PathBuf]) -> Result<Self> {
        let candidates: Vec<PathBuf> = search_paths
            .iter()
            .map(|base| base.join(name).join(THEME_SUBDIR))
            .collect();
        match candidates.iter().find(|dir| dir.join(MANIFEST_FILE).is_file()) {
            Some(dir) => Self::load(dir),
            None => {
                let missing = candidates
                    .first()
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(name))
                    .join(MANIFEST_FILE);
                Err(Error::io(
                    missing,
                    std::io::Error::new(std::io::ErrorKind::NotFound, format!("theme '{name}' not found")),
                ))
            }
        }
    }

    /// The theme directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The theme's display name.
    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    /// The parsed manifest.
    pub fn manifest(&self) -> &ThemeManifest {
        &self.manifest
    }

    /// The engine holding the theme's stylesheets.
    pub fn engine(&self) -> &StyleEngine {
        &self.engine
    }

    /// Mutable access, e.g. for hot reload.
    pub fn engine_mut(&mut self) -> &mut StyleEngine {
        &mut self.engine
    }

    /// Give up the theme and keep its engine.
    pub fn into_engine(self) -> StyleEngine {
        self.engine
    }
}

/// Directories searched for installed themes, most specific first.
pub fn default_theme_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(data) = dirs::data_dir() {
        paths.push(data.join("themes"));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".themes"));
    }
    match std::env::var_os("XDG_DATA_DIRS") {
        Some(dirs) if !dirs.is_empty() => {
            paths.extend(std::env::split_paths(&dirs).map(|d| d.join("themes")));
        }
        _ => {
            paths.push(PathBuf::from("/usr/local/share/themes"));
            paths.push(PathBuf::from("/usr/share/themes"));
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_theme(dir: &Path, manifest: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
    }

    #[test]
    fn loads_stylesheets_with_index_priority() {
        let dir = tempfile::tempdir().unwrap();
        write_theme(
            dir.path(),
            "name = \"t\"\nstylesheets = [\"a.css\", \"b.css\"]\nrecursion-limit = 8",
        );
        fs::write(dir.path().join("a.css"), ".x { p: a; }").unwrap();
        fs::write(dir.path().join("b.css"), ".x { p: b; }\n.y { p: b; }").unwrap();

        let theme = Theme::load(dir.path()).unwrap();
        assert_eq!(theme.name(), "t");
        let sheets = theme.engine().stylesheets();
        assert_eq!(sheets.len(), 2);
        assert_eq!((sheets[0].priority, sheets[1].priority), (0, 1));
        assert_eq!(theme.engine().rule_count(), 3);
        assert_eq!(theme.engine().options().recursion_limit, 8);
        assert_eq!(theme.engine().options().theme_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn missing_manifest_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(Theme::load(dir.path()), Err(Error::Io { .. })));
    }

    #[test]
    fn broken_stylesheet_fails_the_theme() {
        let dir = tempfile::tempdir().unwrap();
        write_theme(dir.path(), "name = \"t\"\nstylesheets = [\"a.css\"]");
        fs::write(dir.path().join("a.css"), ".x { p: 1 }").unwrap();
        assert!(matches!(Theme::load(dir.path()), Err(Error::Parse { .. })));
    }

    #[test]
    fn finds_installed_themes() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_theme(
            &second.path().join("night").join(THEME_SUBDIR),
            "name = \"Night\"\nstylesheets = []",
        );
        let paths = vec![first.path().to_path_buf(), second.path().to_path_buf()];

        assert_eq!(Theme::find_in("night", &paths).unwrap().name(), "Night");
        assert!(matches!(Theme::find_in("day", &paths), Err(Error::Io { .. })));
    }
}
