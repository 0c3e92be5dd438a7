//! End-to-end tests for matching, cascading and style application.

use std::fs;

use xfdashboard_core::{ActorId, ActorTree, Color, PropertySpec, TypeRegistry, Value, ValueKind};
use xfdashboard_theme::prelude::*;

fn types() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    types.register_type("Actor", None).unwrap();
    types.register_type("Group", Some("Actor")).unwrap();
    types.register_type("Label", Some("Actor")).unwrap();
    types
        .install_property("Actor", PropertySpec::new("color", ValueKind::Color, Color::BLACK))
        .unwrap();
    types
        .install_property("Actor", PropertySpec::new("opacity", ValueKind::Float, 1.0))
        .unwrap();
    types
        .install_property("Label", PropertySpec::new("text", ValueKind::String, ""))
        .unwrap();
    types
}

fn engine(css: &str) -> StyleEngine {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut engine = StyleEngine::default();
    engine.load_stylesheet_from_str("test.css", css, 0).unwrap();
    engine
}

fn value_for(engine: &StyleEngine, tree: &ActorTree, id: ActorId, property: &str) -> Option<String> {
    let actor = tree.actor(id).unwrap();
    engine
        .get_properties_for(&actor)
        .get(property)
        .map(|v| v.value.clone())
}

#[test]
fn test_higher_score_wins_regardless_of_load_order() {
    let mut tree = ActorTree::new(types());
    let id = tree.create_actor("Label").unwrap();
    tree.set_name(id, Some("title")).unwrap();

    let engine = engine("#title { text: id; }\nLabel { text: type; }\n.none, Label { text: late; }");
    assert_eq!(value_for(&engine, &tree, id, "text").as_deref(), Some("id"));
}

#[test]
fn test_equal_score_later_rule_or_priority_wins() {
    let mut tree = ActorTree::new(types());
    let id = tree.create_actor("Label").unwrap();
    tree.add_class(id, "a").unwrap();
    tree.add_class(id, "b").unwrap();

    let engine = engine(".a { text: first; }\n.b { text: second; }");
    assert_eq!(value_for(&engine, &tree, id, "text").as_deref(), Some("second"));

    let mut engine = StyleEngine::default();
    engine.load_stylesheet_from_str("high.css", ".a { text: high; }", 10).unwrap();
    engine.load_stylesheet_from_str("low.css", "\n\n\n.b { text: low; }", 1).unwrap();
    assert_eq!(value_for(&engine, &tree, id, "text").as_deref(), Some("high"));
}

#[test]
fn test_class_lists_require_every_class() {
    let mut tree = ActorTree::new(types());
    let both = tree.create_actor("Label").unwrap();
    tree.set_classes_from_str(both, "a b").unwrap();
    let one = tree.create_actor("Label").unwrap();
    tree.add_class(one, "a").unwrap();

    let engine = engine(".a.b { text: both; }");
    assert_eq!(value_for(&engine, &tree, both, "text").as_deref(), Some("both"));
    assert_eq!(value_for(&engine, &tree, one, "text"), None);
}

#[test]
fn test_descendant_and_child_combinators() {
    let mut tree = ActorTree::new(types());
    let outer = tree.create_actor("Group").unwrap();
    let inner = tree.create_actor("Actor").unwrap();
    let deep = tree.create_actor("Label").unwrap();
    let direct = tree.create_actor("Label").unwrap();
    tree.set_parent(inner, Some(outer)).unwrap();
    tree.set_parent(deep, Some(inner)).unwrap();
    tree.set_parent(direct, Some(outer)).unwrap();

    let engine = engine("Group Label { text: descendant; }\nGroup > Label { opacity: 0.5; }");
    assert_eq!(value_for(&engine, &tree, deep, "text").as_deref(), Some("descendant"));
    assert_eq!(value_for(&engine, &tree, direct, "text").as_deref(), Some("descendant"));
    assert_eq!(value_for(&engine, &tree, deep, "opacity"), None);
    assert_eq!(value_for(&engine, &tree, direct, "opacity").as_deref(), Some("0.5"));
}

#[test]
fn test_pseudo_classes_and_supertypes() {
    let mut tree = ActorTree::new(types());
    let id = tree.create_actor("Label").unwrap();

    let engine = engine("Actor:hover { opacity: 0.9; }\nActor { opacity: 0.1; }");
    assert_eq!(value_for(&engine, &tree, id, "opacity").as_deref(), Some("0.1"));
    tree.add_pseudo_class(id, "hover").unwrap();
    assert_eq!(value_for(&engine, &tree, id, "opacity").as_deref(), Some("0.9"));
}

#[test]
fn test_constants_resolve_lazily() {
    let mut tree = ActorTree::new(types());
    let id = tree.create_actor("Label").unwrap();
    tree.add_class(id, "foo").unwrap();

    let engine = engine(
        "@constants { x: 5; base: rgb(50%, 50%, 50%); }\n.foo { text: @x; color: @base; }",
    );
    assert_eq!(value_for(&engine, &tree, id, "text").as_deref(), Some("5"));
    assert_eq!(value_for(&engine, &tree, id, "color").as_deref(), Some("#808080ff"));
}

#[test]
fn test_cyclic_constants_fail_without_hanging() {
    let mut tree = ActorTree::new(types());
    let id = tree.create_actor("Label").unwrap();
    tree.add_class(id, "foo").unwrap();

    let engine = engine("@constants { a: @b; b: @a; }\n.foo { text: @a; opacity: 0.3; }");
    assert_eq!(value_for(&engine, &tree, id, "text"), None);
    assert_eq!(value_for(&engine, &tree, id, "opacity").as_deref(), Some("0.3"));
    assert!(engine.evaluator().resolve("@a", None).unwrap_err().is_recursion());
}

#[test]
fn test_unstyled_properties_reset_to_default() {
    let mut tree = ActorTree::new(types());
    let id = tree.create_actor("Label").unwrap();
    tree.add_class(id, "alert").unwrap();

    let engine = engine(".alert { color: red; }");
    engine.restyle_invalidated(&mut tree).unwrap();
    assert_eq!(tree.property(id, "color").unwrap(), &Value::Color(Color::rgb(255, 0, 0)));

    tree.remove_class(id, "alert").unwrap();
    engine.restyle_invalidated(&mut tree).unwrap();
    assert_eq!(tree.property(id, "color").unwrap(), &Value::Color(Color::BLACK));
}

#[test]
fn test_function_errors_drop_single_property() {
    let mut tree = ActorTree::new(types());
    let id = tree.create_actor("Label").unwrap();

    let engine = engine(
        "Label { color: rgb(300, 0, 0); text: rgb(50%, 0, 0); opacity: 0.4; }\n\
         Actor { -x-mix: mix(red, blue, 1.5); -x-first: mix(red, blue, 0.0); -x-second: mix(red, blue, 1.0); }",
    );
    let actor = tree.actor(id).unwrap();
    let props = engine.get_properties_for(&actor);
    assert!(!props.contains_key("color"));
    assert!(!props.contains_key("-x-mix"));
    assert_eq!(props["text"].value, "#800000ff");
    assert_eq!(props["opacity"].value, "0.4");
    assert_eq!(Color::parse(&props["-x-first"].value), Color::parse("red"));
    assert_eq!(Color::parse(&props["-x-second"].value), Color::parse("blue"));
}

#[test]
fn test_imports_splice_at_directive() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.css"), ".x { p: 2; }").unwrap();
    fs::write(dir.path().join("a.css"), ".x { p: 1; }\n@import(b.css);").unwrap();
    fs::write(dir.path().join("c.css"), "@import(b.css);\n.x { p: 1; }").unwrap();

    let mut tree = ActorTree::new(types());
    let id = tree.create_actor("Label").unwrap();
    tree.add_class(id, "x").unwrap();

    let mut trailing = StyleEngine::default();
    trailing.load_stylesheet(&dir.path().join("a.css"), 0).unwrap();
    let selectors: Vec<String> = trailing.rules().map(ToString::to_string).collect();
    assert_eq!(selectors, [".x { p: 1; }", ".x { p: 2; }"]);
    assert_eq!(value_for(&trailing, &tree, id, "p").as_deref(), Some("2"));

    let mut leading = StyleEngine::default();
    leading.load_stylesheet(&dir.path().join("c.css"), 0).unwrap();
    assert_eq!(value_for(&leading, &tree, id, "p").as_deref(), Some("1"));
}

#[test]
fn test_broken_file_contributes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ok.css"), ".ok { p: 1; }").unwrap();
    fs::write(dir.path().join("bad.css"), ".a { p: 1; }\n.b { p: ; }").unwrap();
    fs::write(dir.path().join("importer.css"), ".c { p: 1; }\n@import(missing.css);").unwrap();

    let mut engine = StyleEngine::default();
    engine.load_stylesheet(&dir.path().join("ok.css"), 0).unwrap();

    let err = engine.load_stylesheet(&dir.path().join("bad.css"), 0).unwrap_err();
    match err {
        Error::Parse { source_name, line, .. } => {
            assert!(source_name.ends_with("bad.css"));
            assert_eq!(line, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        engine.load_stylesheet(&dir.path().join("importer.css"), 0),
        Err(Error::Import { line: 2, column: 1, .. })
    ));
    assert_eq!(engine.rule_count(), 1);
}

#[test]
fn test_restyle_recurses_into_children() {
    let mut tree = ActorTree::new(types());
    let group = tree.create_actor("Group").unwrap();
    let label = tree.create_actor("Label").unwrap();
    tree.set_parent(label, Some(group)).unwrap();

    let engine = engine(".dark Label { color: #101010; }");
    engine.restyle_invalidated(&mut tree).unwrap();
    assert_eq!(tree.property(label, "color").unwrap(), &Value::Color(Color::BLACK));

    tree.add_class(group, "dark").unwrap();
    assert_eq!(engine.restyle_invalidated(&mut tree).unwrap(), 1);
    assert_eq!(
        tree.property(label, "color").unwrap(),
        &Value::Color(Color::rgb(0x10, 0x10, 0x10))
    );
}
