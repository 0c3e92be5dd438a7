//! Style rules and stylesheets.

mod rule;
mod stylesheet;

pub use rule::{PropertyMap, PropertyValue, Rule, RuleKind};
pub use stylesheet::Stylesheet;
