//! Icon theme discovery and loading.
//!
//! Themes are looked up in the freedesktop base directories: the user's data
//! directory, `~/.icons`, every `$XDG_DATA_DIRS` entry and `/usr/share/pixmaps`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{IconThemeDirectory, IconThemeInfo};

/// Discovers icon themes and parses their `index.theme` files.
#[derive(Debug)]
pub struct IconThemeLoader {
    search_paths: Vec<PathBuf>,
    themes: HashMap<String, IconThemeInfo>,
}

impl IconThemeLoader {
    /// Create a loader with the default search paths.
    pub fn new() -> Self {
        Self::with_paths(Self::default_search_paths())
    }

    /// Create a loader with custom search paths.
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths: paths,
            themes: HashMap::new(),
        }
    }

    /// Add a search path.
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.search_paths.contains(&path) {
            self.search_paths.push(path);
        }
    }

    /// Current search paths.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Scan every search path for themes, replacing what was found before.
    ///
    /// A theme present in several base directories is merged into one entry
    /// listing all of them. Returns the number of distinct themes.
    pub fn discover_themes(&mut self) -> usize {
        self.themes.clear();

        for search_path in &self.search_paths {
            let Ok(entries) = fs::read_dir(search_path) else {
                continue;
            };

            for entry in entries.flatten() {
                let path = entry.path();
                if !path.join("index.theme").is_file() {
                    continue;
                }
                match parse_theme(&path) {
                    Ok(info) => {
                        if let Some(existing) = self.themes.get_mut(&info.id) {
                            for base in info.base_paths {
                                if !existing.base_paths.contains(&base) {
                                    existing.base_paths.push(base);
                                }
                            }
                        } else {
                            self.themes.insert(info.id.clone(), info);
                        }
                    }
                    Err(e) => {
                        tracing::debug!(target: "xfdashboard_theme::icons", error = %e, "skipping icon theme");
                    }
                }
            }
        }

        tracing::debug!(
            target: "xfdashboard_theme::icons",
            themes = self.themes.len(),
            "discovered icon themes"
        );
        self.themes.len()
    }

    /// A discovered theme by id.
    pub fn get_theme(&self, id: &str) -> Option<&IconThemeInfo> {
        self.themes.get(id)
    }

    /// Whether a theme was discovered.
    pub fn has_theme(&self, id: &str) -> bool {
        self.themes.contains_key(id)
    }

    /// Ids of all discovered themes.
    pub fn theme_ids(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(data) = dirs::data_dir() {
            paths.push(data.join("icons"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".icons"));
        }

        match std::env::var("XDG_DATA_DIRS") {
            Ok(data_dirs) if !data_dirs.is_empty() => {
                paths.extend(data_dirs.split(':').map(|dir| PathBuf::from(dir).join("icons")));
            }
            _ => {
                paths.push(PathBuf::from("/usr/local/share/icons"));
                paths.push(PathBuf::from("/usr/share/icons"));
            }
        }

        paths.push(PathBuf::from("/usr/share/pixmaps"));
        paths
    }
}

impl Default for IconThemeLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `theme_path/index.theme`.
fn parse_theme(theme_path: &Path) -> crate::Result<IconThemeInfo> {
    let id = theme_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let index_path = theme_path.join("index.theme");
    let content = fs::read_to_string(&index_path).map_err(|e| crate::Error::io(&index_path, e))?;

    let mut info = parse_index(id, &content);
    info.base_paths.push(theme_path.to_path_buf());
    Ok(info)
}

/// Parse the INI-style contents of an `index.theme`.
pub(crate) fn parse_index(id: &str, content: &str) -> IconThemeInfo {
    let mut info = IconThemeInfo::new(id);
    let mut section = String::new();
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut directories: Vec<String> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = name.to_string();
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        if section == "Icon Theme" {
            match key {
                "Name" => info.name = value.to_string(),
                "Comment" => info.comment = Some(value.to_string()),
                "Inherits" => {
                    info.inherits = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect();
                }
                "Hidden" => info.hidden = value.eq_ignore_ascii_case("true"),
                "Directories" | "ScaledDirectories" => {
                    for dir in value.split(',').map(str::trim) {
                        if !dir.is_empty() && !directories.iter().any(|d| d == dir) {
                            directories.push(dir.to_string());
                        }
                    }
                }
                _ => {}
            }
        } else if !section.is_empty() {
            sections
                .entry(section.clone())
                .or_default()
                .insert(key.to_string(), value.to_string());
        }
    }

    for path in directories {
        let Some(keys) = sections.get(&path) else {
            continue;
        };
        let Some(size) = keys.get("Size").and_then(|s| s.parse().ok()) else {
            continue;
        };
        info.directories.push(IconThemeDirectory {
            size,
            scale: keys.get("Scale").and_then(|s| s.parse().ok()).unwrap_or(1),
            context: keys.get("Context").cloned(),
            path,
        });
    }

    if info.name.is_empty() {
        info.name = info.id.clone();
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = "\
[Icon Theme]
Name=Test Icons
Comment=For tests
Inherits=parent, hicolor
Directories=16x16/apps,scalable/apps,broken

# comment
[16x16/apps]
Size=16
Context=Applications

[scalable/apps]
Size=64
Scale=2
Type=Scalable
";

    #[test]
    fn parse_index_reads_theme_section() {
        let info = parse_index("test", INDEX);
        assert_eq!(info.name, "Test Icons");
        assert_eq!(info.comment.as_deref(), Some("For tests"));
        assert_eq!(info.inherits, ["parent", "hicolor"]);
        assert_eq!(info.directories.len(), 2);
        assert_eq!(info.directories[0].context.as_deref(), Some("Applications"));
        assert_eq!(info.directories[1].scale, 2);
    }

    #[test]
    fn discover_merges_base_paths() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        for base in [first.path(), second.path()] {
            let theme = base.join("test");
            fs::create_dir_all(&theme).unwrap();
            fs::write(theme.join("index.theme"), INDEX).unwrap();
        }
        fs::create_dir_all(first.path().join("not-a-theme")).unwrap();

        let mut loader = IconThemeLoader::with_paths(vec![first.path().into(), second.path().into()]);
        assert_eq!(loader.discover_themes(), 1);
        assert!(loader.has_theme("test"));
        assert_eq!(loader.get_theme("test").unwrap().base_paths.len(), 2);
        assert_eq!(loader.theme_ids().count(), 1);
    }

    #[test]
    fn add_search_path_dedups() {
        let mut loader = IconThemeLoader::with_paths(vec![]);
        loader.add_search_path("/x");
        loader.add_search_path("/x");
        assert_eq!(loader.search_paths().len(), 1);
    }
}
