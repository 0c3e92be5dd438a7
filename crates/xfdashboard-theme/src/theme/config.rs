//! The `theme.toml` manifest.

use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

/// File name of the manifest inside a theme directory.
pub const MANIFEST_FILE: &str = "theme.toml";

/// Contents of a theme's `theme.toml`.
///
/// ```toml
/// name = "xfdashboard"
/// comment = "Default theme"
/// stylesheets = ["xfdashboard.css", "extra.css"]
/// icon-theme = "hicolor"
/// recursion-limit = 128
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ThemeManifest {
    /// Display name.
    pub name: String,
    /// Short description.
    #[serde(default)]
    pub comment: Option<String>,
    /// Stylesheets relative to the theme directory, lowest priority first.
    pub stylesheets: Vec<String>,
    /// Icon theme for `try_icons()`.
    #[serde(default)]
    pub icon_theme: Option<String>,
    /// Ceiling on nested value resolution.
    #[serde(default)]
    pub recursion_limit: Option<usize>,
}

impl ThemeManifest {
    /// Read and parse the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(path, &text)
    }

    /// Parse manifest text; `path` is only used for error reporting.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_manifest() {
        let manifest = ThemeManifest::parse(
            Path::new("theme.toml"),
            r#"
name = "xfdashboard"
comment = "Default theme"
stylesheets = ["xfdashboard.css", "extra.css"]
icon-theme = "hicolor"
recursion-limit = 64
"#,
        )
        .unwrap();
        assert_eq!(manifest.name, "xfdashboard");
        assert_eq!(manifest.stylesheets, ["xfdashboard.css", "extra.css"]);
        assert_eq!(manifest.icon_theme.as_deref(), Some("hicolor"));
        assert_eq!(manifest.recursion_limit, Some(64));
    }

    #[test]
    fn optional_fields_default() {
        let manifest =
            ThemeManifest::parse(Path::new("theme.toml"), "name = \"x\"\nstylesheets = []").unwrap();
        assert_eq!(manifest.comment, None);
        assert_eq!(manifest.icon_theme, None);
        assert_eq!(manifest.recursion_limit, None);
    }

    #[test]
    fn malformed_manifest_is_config_error() {
        for text in ["name = ", "stylesheets = []", "name = \"x\"\nstylesheets = []\ncolour = 1"] {
            let err = ThemeManifest::parse(Path::new("t/theme.toml"), text).unwrap_err();
            assert!(matches!(err, Error::Config { ref path, .. } if path == Path::new("t/theme.toml")));
        }
    }
}
