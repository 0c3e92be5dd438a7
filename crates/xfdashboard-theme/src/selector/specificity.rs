//! Selector scoring weights and cascade ordering.
//!
//! A matching selector scores the sum of the weights of every constraint in
//! every part. The scale keeps id above any realistic number of classes and
//! pseudo-classes, and those above type names:
//!
//! | constraint                     | weight |
//! |--------------------------------|--------|
//! | `#id`                          | 100    |
//! | `.class` (each)                | 10     |
//! | `:pseudo-class` (each)         | 10     |
//! | type name, exact type          | 2      |
//! | type name, matched a supertype | 1      |
//! | `*` or no type                 | 0      |

/// Weight of an id constraint.
pub const ID_WEIGHT: u32 = 100;
/// Weight of each class constraint.
pub const CLASS_WEIGHT: u32 = 10;
/// Weight of each pseudo-class constraint.
pub const PSEUDO_CLASS_WEIGHT: u32 = 10;
/// Weight of a type name equal to the actor's own type.
pub const EXACT_TYPE_WEIGHT: u32 = 2;
/// Weight of a type name matching one of the actor's supertypes.
pub const SUPERTYPE_WEIGHT: u32 = 1;
/// Weight of the wildcard.
pub const WILDCARD_WEIGHT: u32 = 0;

/// Sort key of a matched rule in the cascade.
///
/// Compared field by field: score, then stylesheet priority, then source
/// line, then source column. Matches with equal keys keep load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CascadeOrder {
    /// Selector score against the actor.
    pub score: u32,
    /// Priority of the stylesheet the rule was loaded with.
    pub priority: i32,
    /// 1-based source line of the selector.
    pub line: u32,
    /// 1-based source column of the selector.
    pub column: u32,
}

impl std::fmt::Display for CascadeOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "score {} priority {} at {}:{}",
            self.score, self.priority, self.line, self.column
        )
    }
}
