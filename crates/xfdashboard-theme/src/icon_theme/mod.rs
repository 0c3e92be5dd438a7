//! Freedesktop icon theme lookup.
//!
//! Used by the `try_icons()` style function to decide whether a name refers to
//! an icon of the configured theme. Lookup follows the theme's `Inherits`
//! chain, falls back to `hicolor` and finally to unthemed icons in the base
//! directories. Sizes are not considered: any directory of a theme counts.

mod loader;
mod resolver;
mod types;

pub use loader::IconThemeLoader;
pub use resolver::IconResolver;
pub use types::{FALLBACK_THEME, ICON_EXTENSIONS, IconThemeDirectory, IconThemeInfo};
