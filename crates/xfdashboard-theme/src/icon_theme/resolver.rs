//! Icon name resolution with caching.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use parking_lot::Mutex;

use super::loader::IconThemeLoader;
use super::types::{FALLBACK_THEME, ICON_EXTENSIONS};

/// Resolves icon names against an icon theme and its parents.
///
/// Themes are discovered lazily on the first lookup. Results are cached per
/// name, including misses.
#[derive(Debug)]
pub struct IconResolver {
    theme: String,
    state: Mutex<ResolverState>,
}

#[derive(Debug)]
struct ResolverState {
    loader: IconThemeLoader,
    discovered: bool,
    cache: HashMap<String, Option<PathBuf>>,
}

impl IconResolver {
    /// A resolver for `theme` using the default search paths.
    pub fn new(theme: impl Into<String>) -> Self {
        Self::with_loader(theme, IconThemeLoader::new())
    }

    /// A resolver for `theme` using a custom loader.
    pub fn with_loader(theme: impl Into<String>, loader: IconThemeLoader) -> Self {
        Self {
            theme: theme.into(),
            state: Mutex::new(ResolverState {
                loader,
                discovered: false,
                cache: HashMap::new(),
            }),
        }
    }

    /// Name of the configured theme.
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Whether the icon theme knows `name`.
    pub fn has_icon(&self, name: &str) -> bool {
        self.icon_path(name).is_some()
    }

    /// File of the first match for `name`, any size.
    pub fn icon_path(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.contains('/') {
            return None;
        }

        let mut state = self.state.lock();
        if let Some(hit) = state.cache.get(name) {
            return hit.clone();
        }
        if !state.discovered {
            state.loader.discover_themes();
            state.discovered = true;
        }

        let found = self.lookup(&state.loader, name);
        tracing::trace!(
            target: "xfdashboard_theme::icons",
            name,
            found = ?found,
            "icon lookup"
        );
        state.cache.insert(name.to_string(), found.clone());
        found
    }

    /// Drop cached results and rediscover themes on the next lookup.
    pub fn clear_cache(&self) {
        let mut state = self.state.lock();
        state.cache.clear();
        state.discovered = false;
    }

    fn lookup(&self, loader: &IconThemeLoader, name: &str) -> Option<PathBuf> {
        for theme_id in self.inheritance_chain(loader) {
            if let Some(theme) = loader.get_theme(&theme_id)
                && let Some(path) = theme.candidates(name).find(|p| p.is_file())
            {
                return Some(path);
            }
        }

        // Unthemed icons live directly in the base directories.
        loader.search_paths().iter().find_map(|base| {
            ICON_EXTENSIONS
                .iter()
                .map(|ext| base.join(format!("{name}.{ext}")))
                .find(|p| p.is_file())
        })
    }

    /// The configured theme, its ancestors breadth-first, then `hicolor`.
    fn inheritance_chain(&self, loader: &IconThemeLoader) -> Vec<String> {
        let mut chain = vec![self.theme.clone()];
        let mut visited = HashSet::new();
        let mut index = 0;

        while index < chain.len() {
            let theme_id = chain[index].clone();
            if visited.insert(theme_id.clone())
                && let Some(theme) = loader.get_theme(&theme_id)
            {
                for parent in &theme.inherits {
                    if !visited.contains(parent) && !chain.contains(parent) {
                        chain.push(parent.clone());
                    }
                }
            }
            index += 1;
        }

        if !chain.iter().any(|t| t == FALLBACK_THEME) {
            chain.push(FALLBACK_THEME.to_string());
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_theme(base: &Path, id: &str, inherits: &str) {
        let dir = base.join(id);
        fs::create_dir_all(dir.join("16x16/apps")).unwrap();
        fs::write(
            dir.join("index.theme"),
            format!(
                "[Icon Theme]\nName={id}\nInherits={inherits}\nDirectories=16x16/apps\n\n[16x16/apps]\nSize=16\n"
            ),
        )
        .unwrap();
    }

    fn resolver(base: &Path, theme: &str) -> IconResolver {
        IconResolver::with_loader(theme, IconThemeLoader::with_paths(vec![base.to_path_buf()]))
    }

    #[test]
    fn follows_inherits_and_hicolor() {
        let base = tempfile::tempdir().unwrap();
        write_theme(base.path(), "child", "parent");
        write_theme(base.path(), "parent", "");
        write_theme(base.path(), "hicolor", "");
        fs::write(base.path().join("parent/16x16/apps/editor.svg"), "").unwrap();
        fs::write(base.path().join("hicolor/16x16/apps/terminal.png"), "").unwrap();
        fs::write(base.path().join("loose.xpm"), "").unwrap();

        let icons = resolver(base.path(), "child");
        assert!(icons.has_icon("editor"));
        assert!(icons.has_icon("terminal"));
        assert!(icons.has_icon("loose"));
        assert!(!icons.has_icon("missing"));
        assert!(!icons.has_icon(""));
    }

    #[test]
    fn misses_are_cached_until_cleared() {
        let base = tempfile::tempdir().unwrap();
        write_theme(base.path(), "hicolor", "");
        let icons = resolver(base.path(), "hicolor");
        assert!(!icons.has_icon("late"));

        fs::write(base.path().join("hicolor/16x16/apps/late.png"), "").unwrap();
        assert!(!icons.has_icon("late"));
        icons.clear_cache();
        assert!(icons.has_icon("late"));
    }

    #[test]
    fn inheritance_cycles_terminate() {
        let base = tempfile::tempdir().unwrap();
        write_theme(base.path(), "a", "b");
        write_theme(base.path(), "b", "a");
        let icons = resolver(base.path(), "a");
        assert!(!icons.has_icon("anything"));
    }
}
