//! Rule matching and property cascading.

use xfdashboard_core::Stylable;

use crate::rules::{PropertyMap, Rule};
use crate::selector::{CascadeOrder, SelectorMatcher};

/// A rule that matched an object, with its cascade sort key.
#[derive(Debug, Clone, Copy)]
pub struct RuleMatch<'a> {
    /// The matched rule.
    pub rule: &'a Rule,
    /// Sort key of the match.
    pub order: CascadeOrder,
}

/// Every selector rule among `rules` matching `object`, in cascade order.
///
/// The sort is stable, so matches with equal keys stay in load order.
/// Constants blocks never match.
pub fn matching_rules<'a, S: Stylable>(
    rules: impl IntoIterator<Item = &'a Rule>,
    object: &S,
) -> Vec<RuleMatch<'a>> {
    let mut matches: Vec<RuleMatch<'a>> = rules
        .into_iter()
        .filter_map(|rule| {
            let selector = rule.selector_ref()?;
            let score = SelectorMatcher::score(selector, object)?;
            tracing::trace!(
                target: "xfdashboard_theme::cascade",
                selector = %selector,
                score,
                source = %rule.source,
                line = rule.line,
                "rule matched"
            );
            Some(RuleMatch {
                rule,
                order: rule.cascade_order(score),
            })
        })
        .collect();
    matches.sort_by_key(|m| m.order);
    matches
}

/// Merge the properties of `matches`, later matches overwriting earlier ones.
///
/// Values are left unresolved.
pub fn cascade_properties(matches: &[RuleMatch<'_>]) -> PropertyMap {
    let mut cascaded = PropertyMap::new();
    for m in matches {
        for (name, value) in m.rule.properties.iter() {
            cascaded.insert(name.clone(), value.clone());
        }
    }
    cascaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Stylesheet;
    use xfdashboard_core::{ActorTree, PropertySpec, TypeRegistry, ValueKind};

    fn tree() -> ActorTree {
        let mut types = TypeRegistry::new();
        types.register_type("Actor", None).unwrap();
        types.register_type("Button", Some("Actor")).unwrap();
        types
            .install_property("Actor", PropertySpec::new("color", ValueKind::String, ""))
            .unwrap();
        ActorTree::new(types)
    }

    fn values(sheet: &Stylesheet, tree: &ActorTree, id: xfdashboard_core::ActorId) -> PropertyMap {
        let actor = tree.actor(id).unwrap();
        cascade_properties(&matching_rules(sheet.iter(), &actor))
    }

    #[test]
    fn higher_score_wins_regardless_of_order() {
        let mut tree = tree();
        let id = tree.create_actor("Button").unwrap();
        tree.add_class(id, "primary").unwrap();

        let sheet = Stylesheet::from_css(
            "t",
            ".primary { color: class; }\nButton { color: type; }\nActor { color: super; }",
            0,
            None,
        )
        .unwrap();
        assert_eq!(values(&sheet, &tree, id)["color"].value, "class");
    }

    #[test]
    fn equal_scores_fall_back_to_source_position() {
        let mut tree = tree();
        let id = tree.create_actor("Button").unwrap();
        tree.add_class(id, "a").unwrap();
        tree.add_class(id, "b").unwrap();

        let sheet = Stylesheet::from_css("t", ".a { color: first; }\n.b { color: second; }", 0, None).unwrap();
        assert_eq!(values(&sheet, &tree, id)["color"].value, "second");

        let same_line = Stylesheet::from_css("t", ".b { color: left; } .a { color: right; }", 0, None).unwrap();
        assert_eq!(values(&same_line, &tree, id)["color"].value, "right");
    }

    #[test]
    fn priority_beats_position() {
        let mut tree = tree();
        let id = tree.create_actor("Button").unwrap();
        let mut rules = Stylesheet::from_css("high", "\n\nButton { color: high; }", 5, None)
            .unwrap()
            .rules;
        rules.extend(
            Stylesheet::from_css("low", "\n\n\n\nButton { color: low; }", 1, None)
                .unwrap()
                .rules,
        );
        let actor = tree.actor(id).unwrap();
        let matches = matching_rules(&rules, &actor);
        assert_eq!(matches.len(), 2);
        assert_eq!(cascade_properties(&matches)["color"].value, "high");
    }

    #[test]
    fn constants_and_misses_are_ignored() {
        let mut tree = tree();
        let id = tree.create_actor("Actor").unwrap();
        let sheet = Stylesheet::from_css("t", "@constants { color: c; }\nButton { color: b; }", 0, None).unwrap();
        assert!(values(&sheet, &tree, id).is_empty());
    }
}
