//! Stylesheet loading with `@import` splicing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::parser::{Statement, parse_stylesheet};
use crate::rules::Rule;
use crate::{Error, Result};

const TARGET: &str = "xfdashboard_theme::parser";

/// The rules contributed by one requested stylesheet, imports included.
#[derive(Debug, Clone)]
pub struct Stylesheet {
    /// Display name used in diagnostics (the path for files).
    pub name: Arc<str>,
    /// Path of the file, `None` for stylesheets parsed from memory.
    pub path: Option<PathBuf>,
    /// Priority every rule of the stylesheet was loaded with.
    pub priority: i32,
    /// Rules in source order with imports spliced at their directive.
    pub rules: Vec<Rule>,
    /// Canonical paths of every file read while loading, in the order they
    /// were opened.
    pub files: Vec<PathBuf>,
}

impl Stylesheet {
    /// Load a stylesheet file and everything it imports.
    ///
    /// Relative imports are looked up next to the importing file first and
    /// then in `theme_dir`. The load is atomic: any error in the file or one
    /// of its imports discards all rules.
    pub fn load(path: impl AsRef<Path>, priority: i32, theme_dir: Option<&Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut loader = Loader::new(priority, theme_dir);
        let mut rules = Vec::new();
        loader.load_file(path, None, &mut rules)?;

        tracing::info!(
            target: TARGET,
            path = %path.display(),
            rules = rules.len(),
            imports = loader.files.len().saturating_sub(1),
            "loaded stylesheet"
        );

        Ok(Self {
            name: Arc::from(path.display().to_string()),
            path: Some(path.to_path_buf()),
            priority,
            rules,
            files: loader.files,
        })
    }

    /// Parse a stylesheet held in memory.
    ///
    /// Relative imports resolve against `theme_dir` only.
    pub fn from_css(name: &str, text: &str, priority: i32, theme_dir: Option<&Path>) -> Result<Self> {
        let mut loader = Loader::new(priority, theme_dir);
        let mut rules = Vec::new();
        loader.load_text(name, text, None, &mut rules)?;

        tracing::debug!(target: TARGET, name, rules = rules.len(), "parsed stylesheet");

        Ok(Self {
            name: Arc::from(name),
            path: None,
            priority,
            rules,
            files: loader.files,
        })
    }

    /// Number of rules, constants blocks included.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the stylesheet contributed no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over rules in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Whether `path` was read while loading this stylesheet.
    pub fn depends_on(&self, path: &Path) -> bool {
        self.files.iter().any(|file| same_file(file, path))
    }
}

/// Where an `@import` directive was written.
struct ImportSite<'a> {
    from: &'a str,
    line: u32,
    column: u32,
}

/// Depth-first loader state for one stylesheet.
struct Loader<'a> {
    priority: i32,
    theme_dir: Option<&'a Path>,
    /// Canonical paths of the files currently being parsed.
    stack: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

impl<'a> Loader<'a> {
    fn new(priority: i32, theme_dir: Option<&'a Path>) -> Self {
        Self {
            priority,
            theme_dir,
            stack: Vec::new(),
            files: Vec::new(),
        }
    }

    fn load_file(&mut self, path: &Path, site: Option<ImportSite<'_>>, rules: &mut Vec<Rule>) -> Result<()> {
        let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if self.stack.contains(&key) {
            return Err(Error::ImportCycle {
                path: path.to_path_buf(),
            });
        }

        let text = std::fs::read_to_string(path).map_err(|source| match &site {
            Some(site) => Error::Import {
                path: path.to_path_buf(),
                from: site.from.to_string(),
                line: site.line,
                column: site.column,
                source,
            },
            None => Error::io(path, source),
        })?;

        self.files.push(key.clone());
        self.stack.push(key);
        let result = self.load_text(&path.display().to_string(), &text, path.parent(), rules);
        self.stack.pop();
        result
    }

    fn load_text(
        &mut self,
        name: &str,
        text: &str,
        base_dir: Option<&Path>,
        rules: &mut Vec<Rule>,
    ) -> Result<()> {
        for statement in parse_stylesheet(text, name, self.priority)? {
            match statement {
                Statement::Rule(rule) => rules.push(rule),
                Statement::Import { target, line, column } => {
                    let path = self.resolve_import(&target, base_dir);
                    tracing::debug!(
                        target: TARGET,
                        from = name,
                        line,
                        import = %path.display(),
                        "importing stylesheet"
                    );
                    let site = ImportSite { from: name, line, column };
                    self.load_file(&path, Some(site), rules)?;
                }
            }
        }
        Ok(())
    }

    /// First existing candidate, or the first candidate so the read reports it.
    fn resolve_import(&self, target: &str, base_dir: Option<&Path>) -> PathBuf {
        let target = Path::new(target);
        if target.is_absolute() {
            return target.to_path_buf();
        }
        let candidates: Vec<PathBuf> = base_dir
            .into_iter()
            .chain(self.theme_dir)
            .map(|dir| dir.join(target))
            .collect();
        candidates
            .iter()
            .find(|candidate| candidate.is_file())
            .or_else(|| candidates.first())
            .cloned()
            .unwrap_or_else(|| target.to_path_buf())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleKind;

    #[test]
    fn from_css_keeps_source_order() {
        let sheet = Stylesheet::from_css(
            "inline",
            "@constants { x: 1; }\n.a { p: 1; }\n.b, .c { p: 2; }",
            4,
            None,
        )
        .unwrap();
        assert_eq!(sheet.len(), 4);
        assert!(matches!(sheet.rules[0].kind, RuleKind::Constants));
        let selectors: Vec<String> = sheet
            .iter()
            .filter_map(|r| r.selector_ref().map(ToString::to_string))
            .collect();
        assert_eq!(selectors, [".a", ".b", ".c"]);
        assert!(sheet.iter().all(|r| r.priority == 4));
        assert!(Arc::ptr_eq(&sheet.rules[2].properties, &sheet.rules[3].properties));
    }

    #[test]
    fn import_splices_in_place() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.css"), ".b { p: 2; }").unwrap();
        std::fs::write(
            dir.path().join("a.css"),
            ".first { p: 1; }\n@import(b.css);\n.last { p: 3; }",
        )
        .unwrap();

        let sheet = Stylesheet::load(dir.path().join("a.css"), 0, None).unwrap();
        let selectors: Vec<String> = sheet
            .iter()
            .filter_map(|r| r.selector_ref().map(ToString::to_string))
            .collect();
        assert_eq!(selectors, [".first", ".b", ".last"]);
        assert_eq!(sheet.files.len(), 2);
        assert!(sheet.depends_on(&dir.path().join("b.css")));
    }

    #[test]
    fn import_falls_back_to_theme_dir() {
        let theme = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        std::fs::write(theme.path().join("shared.css"), ".shared { p: 1; }").unwrap();
        std::fs::write(other.path().join("main.css"), "@import \"shared.css\";").unwrap();

        let sheet = Stylesheet::load(other.path().join("main.css"), 0, Some(theme.path())).unwrap();
        assert_eq!(sheet.len(), 1);
    }

    #[test]
    fn missing_import_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.css"), ".a { p: 1; }\n@import(nope.css);").unwrap();
        let err = Stylesheet::load(dir.path().join("a.css"), 0, None).unwrap_err();
        match &err {
            Error::Import { path, from, line, column, .. } => {
                assert!(path.ends_with("nope.css"));
                assert!(from.ends_with("a.css"));
                assert_eq!((*line, *column), (2, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_structural());
    }

    #[test]
    fn import_cycle_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.css"), "@import(b.css);").unwrap();
        std::fs::write(dir.path().join("b.css"), "@import(a.css);").unwrap();
        let err = Stylesheet::load(dir.path().join("a.css"), 0, None).unwrap_err();
        assert!(matches!(err, Error::ImportCycle { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Stylesheet::load(dir.path().join("absent.css"), 0, None).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
