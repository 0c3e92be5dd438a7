//! Selector matching and scoring.

use xfdashboard_core::Stylable;

use super::specificity::{
    CLASS_WEIGHT, EXACT_TYPE_WEIGHT, ID_WEIGHT, PSEUDO_CLASS_WEIGHT, SUPERTYPE_WEIGHT,
    WILDCARD_WEIGHT,
};
use super::{Combinator, Selector, SelectorPart, TypeSelector};

/// Selector matching engine.
pub struct SelectorMatcher;

impl SelectorMatcher {
    /// Score `selector` against `object`, or `None` if it does not match.
    ///
    /// The subject part must match the object itself. The remaining parts are
    /// matched right to left against the object's ancestors: a child
    /// combinator only accepts the immediate parent, a descendant combinator
    /// tries the closest ancestor first and backtracks outward.
    pub fn score<S: Stylable>(selector: &Selector, object: &S) -> Option<u32> {
        let last = selector.parts.len().checked_sub(1)?;
        let subject = Self::part_score(&selector.parts[last], object)?;
        if last == 0 {
            return Some(subject);
        }
        Some(subject + Self::score_ancestors(selector, last - 1, object)?)
    }

    /// Whether `selector` matches `object`.
    pub fn matches<S: Stylable>(selector: &Selector, object: &S) -> bool {
        Self::score(selector, object).is_some()
    }

    /// Match `parts[..=index]` against the ancestors of `child`.
    fn score_ancestors<S: Stylable>(selector: &Selector, index: usize, child: &S) -> Option<u32> {
        let part = &selector.parts[index];
        match selector.combinators.get(index)? {
            Combinator::Child => {
                let parent = child.parent()?;
                let score = Self::part_score(part, &parent)?;
                if index == 0 {
                    return Some(score);
                }
                Some(score + Self::score_ancestors(selector, index - 1, &parent)?)
            }
            Combinator::Descendant => {
                let mut ancestor = child.parent();
                while let Some(candidate) = ancestor {
                    if let Some(score) = Self::part_score(part, &candidate) {
                        if index == 0 {
                            return Some(score);
                        }
                        if let Some(rest) = Self::score_ancestors(selector, index - 1, &candidate) {
                            return Some(score + rest);
                        }
                    }
                    ancestor = candidate.parent();
                }
                None
            }
        }
    }

    /// Score a single part against `object`. Absent constraints are satisfied.
    pub fn part_score<S: Stylable>(part: &SelectorPart, object: &S) -> Option<u32> {
        let mut score = match &part.type_selector {
            None | Some(TypeSelector::Universal) => WILDCARD_WEIGHT,
            Some(TypeSelector::Type(name)) => {
                if object.type_name() == name {
                    EXACT_TYPE_WEIGHT
                } else if object.type_chain().iter().any(|t| t == name) {
                    SUPERTYPE_WEIGHT
                } else {
                    return None;
                }
            }
        };

        if let Some(id) = &part.id {
            if object.name() != Some(id.as_str()) {
                return None;
            }
            score += ID_WEIGHT;
        }

        for class in &part.classes {
            if !object.has_class(class) {
                return None;
            }
            score += CLASS_WEIGHT;
        }

        for pseudo in &part.pseudo_classes {
            if !object.has_pseudo_class(pseudo) {
                return None;
            }
            score += PSEUDO_CLASS_WEIGHT;
        }

        Some(score)
    }
}
