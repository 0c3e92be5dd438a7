//! Single style rule definition.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::selector::{CascadeOrder, Selector};

/// A property value together with where it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyValue {
    /// The value text. Raw as written in a rule, resolved in an effective set.
    pub value: String,
    /// Name of the stylesheet the declaration came from.
    pub source: Arc<str>,
    /// 1-based line of the declaration.
    pub line: u32,
    /// 1-based column of the declaration.
    pub column: u32,
}

impl PropertyValue {
    /// A value with provenance.
    pub fn new(value: impl Into<String>, source: Arc<str>, line: u32, column: u32) -> Self {
        Self {
            value: value.into(),
            source,
            line,
            column,
        }
    }

    /// Same provenance, different text.
    pub fn with_value(&self, value: String) -> Self {
        Self {
            value,
            source: self.source.clone(),
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{}:{})", self.value, self.source, self.line, self.column)
    }
}

/// Property name to value, ordered by name.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// What a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// An ordinary rule styling actors matched by the selector.
    Selector(Selector),
    /// An `@constants` block defining `@name` values.
    Constants,
}

/// A selector (or constants marker) paired with its property map.
///
/// Rules are immutable once parsed. All selectors of one comma-separated list
/// share a single property map.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Selector or constants marker.
    pub kind: RuleKind,
    /// Declarations of the block.
    pub properties: Arc<PropertyMap>,
    /// Name of the stylesheet file the rule was parsed from.
    pub source: Arc<str>,
    /// 1-based line of the selector.
    pub line: u32,
    /// 1-based column of the selector.
    pub column: u32,
    /// Priority of the stylesheet the rule was loaded with.
    pub priority: i32,
}

impl Rule {
    /// An ordinary selector rule.
    pub fn selector(
        selector: Selector,
        properties: Arc<PropertyMap>,
        source: Arc<str>,
        line: u32,
        column: u32,
        priority: i32,
    ) -> Self {
        Self {
            kind: RuleKind::Selector(selector),
            properties,
            source,
            line,
            column,
            priority,
        }
    }

    /// An `@constants` block.
    pub fn constants(
        properties: Arc<PropertyMap>,
        source: Arc<str>,
        line: u32,
        column: u32,
        priority: i32,
    ) -> Self {
        Self {
            kind: RuleKind::Constants,
            properties,
            source,
            line,
            column,
            priority,
        }
    }

    /// The selector, unless this is a constants block.
    pub fn selector_ref(&self) -> Option<&Selector> {
        match &self.kind {
            RuleKind::Selector(selector) => Some(selector),
            RuleKind::Constants => None,
        }
    }

    /// Whether this is a constants block.
    pub fn is_constants(&self) -> bool {
        matches!(self.kind, RuleKind::Constants)
    }

    /// Cascade sort key for a match with the given score.
    pub fn cascade_order(&self, score: u32) -> CascadeOrder {
        CascadeOrder {
            score,
            priority: self.priority,
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RuleKind::Selector(selector) => write!(f, "{selector}")?,
            RuleKind::Constants => write!(f, "@constants")?,
        }
        write!(f, " {{")?;
        for (name, value) in self.properties.iter() {
            write!(f, " {}: {};", name, value.value)?;
        }
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> Arc<PropertyMap> {
        let source: Arc<str> = Arc::from("test.css");
        let mut map = PropertyMap::new();
        map.insert("color".into(), PropertyValue::new("red", source.clone(), 2, 3));
        map.insert("opacity".into(), PropertyValue::new("0.5", source, 3, 3));
        Arc::new(map)
    }

    #[test]
    fn rule_display() {
        let rule = Rule::selector(".a".parse().unwrap(), props(), Arc::from("test.css"), 1, 1, 0);
        assert_eq!(rule.to_string(), ".a { color: red; opacity: 0.5; }");
        let constants = Rule::constants(props(), Arc::from("test.css"), 1, 1, 0);
        assert!(constants.is_constants());
        assert!(constants.selector_ref().is_none());
        assert!(constants.to_string().starts_with("@constants {"));
    }

    #[test]
    fn cascade_order_uses_rule_position() {
        let rule = Rule::selector(".a".parse().unwrap(), props(), Arc::from("x"), 7, 4, 3);
        let order = rule.cascade_order(12);
        assert_eq!(
            order,
            CascadeOrder {
                score: 12,
                priority: 3,
                line: 7,
                column: 4
            }
        );
    }
}
