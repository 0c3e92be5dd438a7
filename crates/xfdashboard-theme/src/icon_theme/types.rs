//! Icon theme metadata.

use std::path::PathBuf;

/// File extensions an icon may have, in lookup order.
pub const ICON_EXTENSIONS: [&str; 3] = ["png", "svg", "xpm"];

/// Name of the theme every lookup falls back to.
pub const FALLBACK_THEME: &str = "hicolor";

/// Information about an icon theme directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconThemeDirectory {
    /// Directory path relative to the theme root.
    pub path: String,
    /// Nominal icon size.
    pub size: u32,
    /// Scale factor (1 for normal, 2 for HiDPI).
    pub scale: u32,
    /// Free-form context (`Actions`, `Places`, ...).
    pub context: Option<String>,
}

/// Icon theme metadata parsed from `index.theme`.
#[derive(Debug, Clone, Default)]
pub struct IconThemeInfo {
    /// Unique theme identifier (directory name).
    pub id: String,
    /// Human-readable theme name.
    pub name: String,
    /// Theme description.
    pub comment: Option<String>,
    /// Parent themes searched when an icon is missing.
    pub inherits: Vec<String>,
    /// Whether to hide the theme from selection UIs.
    pub hidden: bool,
    /// Icon directories listed by the theme.
    pub directories: Vec<IconThemeDirectory>,
    /// Every location the theme was found in.
    pub base_paths: Vec<PathBuf>,
}

impl IconThemeInfo {
    /// Create a theme info with just an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Candidate files for `name` in this theme, any size.
    ///
    /// Directories are visited in declaration order and every base path is
    /// tried for each directory.
    pub fn candidates<'a>(&'a self, name: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
        self.directories.iter().flat_map(move |dir| {
            self.base_paths.iter().flat_map(move |base| {
                ICON_EXTENSIONS
                    .iter()
                    .map(move |ext| base.join(&dir.path).join(format!("{name}.{ext}")))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_cover_every_directory_and_extension() {
        let mut info = IconThemeInfo::new("test");
        info.base_paths.push(PathBuf::from("/a"));
        info.base_paths.push(PathBuf::from("/b"));
        for (path, size) in [("16x16/apps", 16), ("scalable/apps", 64)] {
            info.directories.push(IconThemeDirectory {
                path: path.into(),
                size,
                scale: 1,
                context: None,
            });
        }

        let candidates: Vec<PathBuf> = info.candidates("term").collect();
        assert_eq!(candidates.len(), 2 * 2 * ICON_EXTENSIONS.len());
        assert_eq!(candidates[0], PathBuf::from("/a/16x16/apps/term.png"));
        assert_eq!(candidates[3], PathBuf::from("/b/16x16/apps/term.png"));
        assert!(candidates.contains(&PathBuf::from("/b/scalable/apps/term.svg")));
    }
}
