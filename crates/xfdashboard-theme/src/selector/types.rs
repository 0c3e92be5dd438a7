//! Selector type definitions.

use std::fmt;
use std::str::FromStr;

/// One selector of a rule, e.g. `Stage .view-button:selected > Label`.
///
/// Parts run from the outermost ancestor to the subject, the actor the rule
/// styles. `combinators[i]` links `parts[i]` to `parts[i + 1]`, so there is
/// always one combinator less than there are parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Never empty.
    pub parts: Vec<SelectorPart>,
    pub combinators: Vec<Combinator>,
}

impl Selector {
    /// The rightmost part.
    pub fn subject(&self) -> Option<&SelectorPart> {
        self.parts.last()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut combinators = self.combinators.iter();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                let joint = match combinators.next() {
                    Some(Combinator::Child) => " > ",
                    _ => " ",
                };
                f.write_str(joint)?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl FromStr for Selector {
    type Err = crate::Error;

    /// Parse a single selector, e.g. `Button.primary:hover`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse_selector(s)
    }
}

/// The constraints on one actor, e.g. `Button#ok.primary:hover`.
///
/// An absent constraint is satisfied by every actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SelectorPart {
    pub type_selector: Option<TypeSelector>,
    /// Required actor name.
    pub id: Option<String>,
    /// Every class is required.
    pub classes: Vec<String>,
    /// Every pseudo-class is required.
    pub pseudo_classes: Vec<String>,
}

impl SelectorPart {
    /// Whether nothing has been parsed into the part yet.
    pub fn is_empty(&self) -> bool {
        self.type_selector.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.pseudo_classes.is_empty()
    }
}

impl fmt::Display for SelectorPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ty) = &self.type_selector {
            write!(f, "{ty}")?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        self.classes.iter().try_for_each(|c| write!(f, ".{c}"))?;
        self.pseudo_classes.iter().try_for_each(|p| write!(f, ":{p}"))
    }
}

/// Type constraint of a selector part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSelector {
    /// `*`
    Universal,
    /// A type name, matching the type itself or any subtype.
    Type(String),
}

impl fmt::Display for TypeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Universal => f.write_str("*"),
            Self::Type(name) => f.write_str(name),
        }
    }
}

/// How a part relates to the part on its right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Whitespace: any ancestor.
    Descendant,
    /// `>`: the immediate parent.
    Child,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_back_to_css() {
        for text in [
            "Stage .primary:hover",
            "Box > Label",
            "XfdashboardButton#ok.primary.large:hover:focus",
            "* > .a Label",
        ] {
            let selector: Selector = text.parse().unwrap();
            assert_eq!(selector.to_string(), text);
        }
    }

    #[test]
    fn empty_part() {
        assert!(SelectorPart::default().is_empty());
        let part = SelectorPart {
            classes: vec!["x".into()],
            ..Default::default()
        };
        assert!(!part.is_empty());
        assert_eq!(part.to_string(), ".x");
    }
}
