//! Main style resolution engine.

use std::path::{Path, PathBuf};

use xfdashboard_core::{Converters, Stylable, TypeRegistry, Value};

use crate::eval::{DEFAULT_RECURSION_LIMIT, Evaluator, FunctionContext, FunctionTable};
use crate::icon_theme::{IconResolver, IconThemeLoader};
use crate::resolve::cascade::{cascade_properties, matching_rules};
use crate::rules::{PropertyMap, Rule, Stylesheet};
use crate::{Error, Result};

/// Construction options of a [`StyleEngine`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Theme root, used for relative imports and `try_icons()` paths.
    pub theme_dir: Option<PathBuf>,
    /// Icon theme consulted by `try_icons()`. No icon lookups without one.
    pub icon_theme: Option<String>,
    /// Icon theme base directories. The freedesktop defaults when `None`.
    pub icon_search_paths: Option<Vec<PathBuf>>,
    /// Ceiling on nested `@name` and function resolution.
    pub recursion_limit: usize,
    /// String to value converters used when applying styles.
    pub converters: Converters,
    /// Style functions available to property values.
    pub functions: FunctionTable,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            theme_dir: None,
            icon_theme: None,
            icon_search_paths: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            converters: Converters::default(),
            functions: FunctionTable::default(),
        }
    }
}

impl EngineOptions {
    /// Options rooted at `theme_dir`.
    pub fn with_theme_dir(mut self, theme_dir: impl Into<PathBuf>) -> Self {
        self.theme_dir = Some(theme_dir.into());
        self
    }

    /// Use `icon_theme` for `try_icons()` lookups.
    pub fn with_icon_theme(mut self, icon_theme: impl Into<String>) -> Self {
        self.icon_theme = Some(icon_theme.into());
        self
    }

    /// Look for icon themes in `paths` only.
    pub fn with_icon_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.icon_search_paths = Some(paths);
        self
    }

    /// Override the recursion ceiling.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }
}

/// The style engine.
///
/// Owns the loaded stylesheets in load order, computes effective property
/// sets for stylable objects and applies them to an
/// [`ActorTree`](xfdashboard_core::ActorTree).
#[derive(Debug)]
pub struct StyleEngine {
    pub(crate) options: EngineOptions,
    icons: Option<IconResolver>,
    stylesheets: Vec<Stylesheet>,
}

impl StyleEngine {
    /// Create an engine without stylesheets.
    pub fn new(options: EngineOptions) -> Self {
        let icons = options.icon_theme.as_deref().map(|theme| match &options.icon_search_paths {
            Some(paths) => IconResolver::with_loader(theme, IconThemeLoader::with_paths(paths.clone())),
            None => IconResolver::new(theme),
        });
        Self {
            options,
            icons,
            stylesheets: Vec::new(),
        }
    }

    /// The options the engine was created with.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Load a stylesheet file and its imports.
    ///
    /// On error nothing from the file is kept and the error is returned.
    #[tracing::instrument(skip(self), target = "xfdashboard_theme::parser", level = "debug")]
    pub fn load_stylesheet(&mut self, path: &Path, priority: i32) -> Result<()> {
        let sheet = Stylesheet::load(path, priority, self.options.theme_dir.as_deref())
            .inspect_err(|e| tracing::error!(target: "xfdashboard_theme::parser", error = %e, "failed to load stylesheet"))?;
        self.stylesheets.push(sheet);
        Ok(())
    }

    /// Parse a stylesheet held in memory.
    pub fn load_stylesheet_from_str(&mut self, name: &str, text: &str, priority: i32) -> Result<()> {
        let sheet = Stylesheet::from_css(name, text, priority, self.options.theme_dir.as_deref())
            .inspect_err(|e| tracing::error!(target: "xfdashboard_theme::parser", error = %e, "failed to parse stylesheet"))?;
        self.stylesheets.push(sheet);
        Ok(())
    }

    /// Reload the stylesheet requested as `path`, keeping its priority and
    /// position. On error the previous rules stay in place.
    pub fn reload_stylesheet(&mut self, path: &Path) -> Result<bool> {
        let Some(index) = self.stylesheets.iter().position(|s| s.path.as_deref() == Some(path)) else {
            return Ok(false);
        };
        let priority = self.stylesheets[index].priority;
        let sheet = Stylesheet::load(path, priority, self.options.theme_dir.as_deref())
            .inspect_err(|e| tracing::error!(target: "xfdashboard_theme::parser", error = %e, "failed to reload stylesheet"))?;
        tracing::info!(target: "xfdashboard_theme::parser", path = %path.display(), "reloaded stylesheet");
        self.stylesheets[index] = sheet;
        Ok(true)
    }

    /// Drop the stylesheet requested as `path`. Returns whether one was loaded.
    pub fn remove_stylesheet(&mut self, path: &Path) -> bool {
        let before = self.stylesheets.len();
        self.stylesheets.retain(|s| s.path.as_deref() != Some(path));
        before != self.stylesheets.len()
    }

    /// Drop every stylesheet.
    pub fn clear(&mut self) {
        self.stylesheets.clear();
        if let Some(icons) = &self.icons {
            icons.clear_cache();
        }
    }

    /// Loaded stylesheets in load order.
    pub fn stylesheets(&self) -> &[Stylesheet] {
        &self.stylesheets
    }

    /// Every rule in load order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.stylesheets.iter().flat_map(Stylesheet::iter)
    }

    /// Total number of rules, constants blocks included.
    pub fn rule_count(&self) -> usize {
        self.stylesheets.iter().map(Stylesheet::len).sum()
    }

    /// An evaluator over the loaded constants.
    pub fn evaluator(&self) -> Evaluator<'_> {
        let context = FunctionContext {
            theme_dir: self.options.theme_dir.as_deref(),
            icons: self.icons.as_ref(),
        };
        Evaluator::new(&self.options.functions, context, self.rules(), self.options.recursion_limit)
    }

    /// The effective, resolved property set of `object`.
    ///
    /// Properties whose value fails to resolve are logged and left out.
    pub fn get_properties_for<S: Stylable>(&self, object: &S) -> PropertyMap {
        let matches = matching_rules(self.rules(), object);
        let cascaded = cascade_properties(&matches);
        let evaluator = self.evaluator();

        let mut resolved = PropertyMap::new();
        for (name, value) in cascaded {
            match evaluator.resolve_value(&value) {
                Ok(text) => {
                    resolved.insert(name, value.with_value(text));
                }
                Err(e) => {
                    tracing::warn!(
                        target: "xfdashboard_theme::eval",
                        object = object.type_name(),
                        property = %name,
                        source = %value.source,
                        line = value.line,
                        column = value.column,
                        error = %e,
                        "cannot resolve property value"
                    );
                }
            }
        }

        tracing::debug!(
            target: "xfdashboard_theme::cascade",
            object = object.type_name(),
            matches = matches.len(),
            properties = resolved.len(),
            "computed style"
        );
        resolved
    }

    /// Convert a resolved value for the stylable property `property` of
    /// `type_name`.
    pub fn convert_property(
        &self,
        types: &TypeRegistry,
        type_name: &str,
        property: &str,
        text: &str,
    ) -> Result<Value> {
        let spec = types
            .find_property(type_name, property)
            .ok_or_else(|| Error::UnknownProperty {
                type_name: type_name.to_string(),
                property: property.to_string(),
            })?;
        self.options
            .converters
            .convert(text, &spec.kind)
            .map_err(|e| Error::Conversion {
                property: property.to_string(),
                value: text.to_string(),
                message: e.reason,
            })
    }
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}
