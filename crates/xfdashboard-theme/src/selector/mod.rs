//! Selector types, matching and scoring.

mod matcher;
mod specificity;
mod types;

pub use matcher::SelectorMatcher;
pub use specificity::{
    CLASS_WEIGHT, CascadeOrder, EXACT_TYPE_WEIGHT, ID_WEIGHT, PSEUDO_CLASS_WEIGHT,
    SUPERTYPE_WEIGHT, WILDCARD_WEIGHT,
};
pub use types::*;
