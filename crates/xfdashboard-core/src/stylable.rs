//! The identity the theming engine reads from an actor.

/// Something selectors can be matched against.
///
/// Implementors expose a type hierarchy, an optional name, style classes,
/// pseudo-classes and a parent. Handles are expected to be cheap to copy,
/// since matching walks up the parent chain by value.
pub trait Stylable: Sized {
    /// The most derived type name.
    fn type_name(&self) -> &str;

    /// The type itself followed by every supertype, most derived first.
    fn type_chain(&self) -> Vec<&str>;

    /// The actor's name, matched by `#name` selectors.
    fn name(&self) -> Option<&str>;

    /// Style classes, matched by `.class` selectors.
    fn classes(&self) -> &[String];

    /// Pseudo-classes, matched by `:pseudo` selectors.
    fn pseudo_classes(&self) -> &[String];

    /// The parent in the actor tree.
    fn parent(&self) -> Option<Self>;

    /// Whether `class` is set.
    fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| c == class)
    }

    /// Whether `pseudo` is set.
    fn has_pseudo_class(&self, pseudo: &str) -> bool {
        self.pseudo_classes().iter().any(|p| p == pseudo)
    }
}
