//! Style resolution: matching, cascading, evaluation and application.

mod apply;
mod cascade;
mod engine;

pub use cascade::{RuleMatch, cascade_properties, matching_rules};
pub use engine::{EngineOptions, StyleEngine};
