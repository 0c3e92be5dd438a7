//! CSS theming engine for Xfdashboard.
//!
//! This crate styles the actors of an [`ActorTree`](xfdashboard_core::ActorTree)
//! from CSS-like stylesheets:
//!
//! - **Parsing**: rules, `@constants` blocks and `@import` directives with
//!   exact line and column diagnostics
//! - **Selectors**: type, class, ID, pseudo-class, descendant and child
//!   selectors scored by specificity
//! - **Cascading**: score, stylesheet priority and source position decide
//!   between competing declarations
//! - **Evaluation**: `@name` constants and functions such as `shade()`,
//!   `mix()` and `try_icons()`, resolved lazily per property
//! - **Themes**: directories described by a `theme.toml` manifest
//! - **Hot Reload**: reload edited stylesheets (feature `hot-reload`)
//!
//! # Example
//!
//! ```
//! use xfdashboard_core::{ActorTree, PropertySpec, TypeRegistry, Value, ValueKind};
//! use xfdashboard_theme::prelude::*;
//!
//! let mut types = TypeRegistry::new();
//! types.register_type("Actor", None).unwrap();
//! types
//!     .install_property("Actor", PropertySpec::new("opacity", ValueKind::Float, 1.0))
//!     .unwrap();
//! let mut tree = ActorTree::new(types);
//! let actor = tree.create_actor("Actor").unwrap();
//! tree.add_class(actor, "dim").unwrap();
//!
//! let mut engine = StyleEngine::new(EngineOptions::default());
//! engine
//!     .load_stylesheet_from_str("inline", "@constants { faded: 0.4; }\n.dim { opacity: @faded; }", 0)
//!     .unwrap();
//! engine.restyle_invalidated(&mut tree).unwrap();
//!
//! assert_eq!(tree.property(actor, "opacity").unwrap(), &Value::Float(0.4));
//! ```

pub mod eval;
pub mod icon_theme;
pub mod parser;
pub mod resolve;
pub mod rules;
pub mod selector;
pub mod theme;

#[cfg(feature = "hot-reload")]
pub mod hot_reload;

mod error;

pub use error::{Error, Result};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::eval::{Evaluator, FunctionContext, FunctionTable, StyleFunction};
    pub use crate::icon_theme::{IconResolver, IconThemeLoader};
    pub use crate::resolve::{EngineOptions, StyleEngine};
    pub use crate::rules::{PropertyMap, PropertyValue, Rule, RuleKind, Stylesheet};
    pub use crate::selector::{Combinator, Selector, SelectorMatcher, SelectorPart};
    pub use crate::theme::{Theme, ThemeManifest};
    pub use crate::{Error, Result};

    #[cfg(feature = "hot-reload")]
    pub use crate::hot_reload::StylesheetWatcher;
}
