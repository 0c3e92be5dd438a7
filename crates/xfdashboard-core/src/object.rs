//! Actor tree for Xfdashboard.
//!
//! Actors live in an arena ([`ActorTree`]) keyed by [`ActorId`]. Each actor
//! has a registered type, an optional name, style classes, pseudo-classes,
//! a parent and ordered children, and a bag of stylable property values.
//!
//! The tree also keeps the bookkeeping the theming engine needs:
//!
//! - the style map that was last applied to each actor, used to reset
//!   properties a restyle no longer sets
//! - a style-dirty flag raised by every change that can alter selector
//!   matching (creation, rename, reparent, class and pseudo-class changes)
//! - nested freeze/thaw of property-change notifications
//!
//! # Example
//!
//! ```
//! use xfdashboard_core::{ActorTree, PropertySpec, Stylable, TypeRegistry, ValueKind};
//!
//! let mut types = TypeRegistry::new();
//! types.register_type("Actor", None).unwrap();
//! types.register_type("Button", Some("Actor")).unwrap();
//! types
//!     .install_property("Actor", PropertySpec::new("opacity", ValueKind::Float, 1.0))
//!     .unwrap();
//!
//! let mut tree = ActorTree::new(types);
//! let stage = tree.create_actor("Actor").unwrap();
//! let button = tree.create_actor("Button").unwrap();
//! tree.set_parent(button, Some(stage)).unwrap();
//! tree.add_class(button, "primary").unwrap();
//!
//! let actor = tree.actor(button).unwrap();
//! assert_eq!(actor.type_chain(), vec!["Button", "Actor"]);
//! assert!(actor.has_class("primary"));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use slotmap::{SlotMap, new_key_type};

use crate::logging::ActorTreeDebug;
use crate::property::{PropertyError, TypeRegistry};
use crate::signal::Signal;
use crate::stylable::Stylable;
use crate::value::Value;

new_key_type! {
    /// Stable handle to an actor in an [`ActorTree`].
    ///
    /// Becomes invalid when the actor is destroyed.
    pub struct ActorId;
}

/// Property name to resolved value text, as last applied by the theme.
pub type AppliedStyle = BTreeMap<String, String>;

/// Errors that can occur during actor operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    /// The actor ID is invalid or has been destroyed.
    InvalidActorId,
    /// Attempted to make an actor its own parent or ancestor.
    CircularParentage,
    /// A property operation failed.
    Property(PropertyError),
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidActorId => write!(f, "Invalid or destroyed actor ID"),
            Self::CircularParentage => {
                write!(f, "Cannot set an actor as its own parent or ancestor")
            }
            Self::Property(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ObjectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Property(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PropertyError> for ObjectError {
    fn from(e: PropertyError) -> Self {
        Self::Property(e)
    }
}

/// Result type for actor operations.
pub type ObjectResult<T> = std::result::Result<T, ObjectError>;

struct ActorData {
    type_name: String,
    name: Option<String>,
    classes: Vec<String>,
    pseudo_classes: Vec<String>,
    parent: Option<ActorId>,
    children: Vec<ActorId>,
    properties: HashMap<String, Value>,
    applied_style: AppliedStyle,
    style_dirty: bool,
    freeze_count: u32,
    pending_notify: Vec<String>,
}

/// Arena of actors plus the type registry they are created from.
pub struct ActorTree {
    types: TypeRegistry,
    actors: SlotMap<ActorId, ActorData>,
    property_changed: Signal<(ActorId, String)>,
}

impl ActorTree {
    /// Create an empty tree over a populated type registry.
    pub fn new(types: TypeRegistry) -> Self {
        Self {
            types,
            actors: SlotMap::with_key(),
            property_changed: Signal::new(),
        }
    }

    /// The type registry actors are created from.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Emitted with `(actor, property)` whenever a property value changes.
    ///
    /// While an actor's notifications are frozen, changes are collected and
    /// emitted once each on the final [`thaw_notify`](Self::thaw_notify).
    pub fn property_changed(&self) -> &Signal<(ActorId, String)> {
        &self.property_changed
    }

    /// Create a root actor of a registered type.
    ///
    /// Every stylable property starts at its default. The new actor is marked
    /// as needing a restyle.
    pub fn create_actor(&mut self, type_name: &str) -> ObjectResult<ActorId> {
        if !self.types.contains_type(type_name) {
            return Err(PropertyError::UnknownType {
                name: type_name.to_string(),
            }
            .into());
        }

        let properties = self
            .types
            .stylable_properties(type_name)
            .into_iter()
            .map(|(name, spec)| (name.to_string(), spec.default.clone()))
            .collect();

        let id = self.actors.insert(ActorData {
            type_name: type_name.to_string(),
            name: None,
            classes: Vec::new(),
            pseudo_classes: Vec::new(),
            parent: None,
            children: Vec::new(),
            properties,
            applied_style: AppliedStyle::new(),
            style_dirty: true,
            freeze_count: 0,
            pending_notify: Vec::new(),
        });
        tracing::trace!(target: "xfdashboard_core::object", ?id, type_name, "created actor");
        Ok(id)
    }

    /// Remove an actor and all its descendants.
    #[tracing::instrument(skip(self), target = "xfdashboard_core::object", level = "trace")]
    pub fn destroy(&mut self, id: ActorId) -> ObjectResult<()> {
        let descendants = self.collect_descendants(id)?;
        tracing::trace!(target: "xfdashboard_core::object", ?id, descendant_count = descendants.len(), "destroying actor tree");

        if let Some(parent_id) = self.actors.get(id).and_then(|d| d.parent)
            && let Some(parent_data) = self.actors.get_mut(parent_id)
        {
            parent_data.children.retain(|&child| child != id);
        }

        for child_id in descendants {
            self.actors.remove(child_id);
        }
        self.actors.remove(id);
        Ok(())
    }

    /// Collect all descendant IDs, children before parents.
    fn collect_descendants(&self, id: ActorId) -> ObjectResult<Vec<ActorId>> {
        let mut result = Vec::new();
        self.collect_descendants_recursive(id, &mut result)?;
        Ok(result)
    }

    fn collect_descendants_recursive(
        &self,
        id: ActorId,
        result: &mut Vec<ActorId>,
    ) -> ObjectResult<()> {
        let data = self.data(id)?;
        for &child_id in &data.children {
            self.collect_descendants_recursive(child_id, result)?;
            result.push(child_id);
        }
        Ok(())
    }

    /// Whether the actor exists.
    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(id)
    }

    /// Number of live actors.
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// A read-only stylable view of one actor.
    pub fn actor(&self, id: ActorId) -> ObjectResult<ActorRef<'_>> {
        self.data(id)?;
        Ok(ActorRef { tree: self, id })
    }

    fn data(&self, id: ActorId) -> ObjectResult<&ActorData> {
        self.actors.get(id).ok_or(ObjectError::InvalidActorId)
    }

    fn data_mut(&mut self, id: ActorId) -> ObjectResult<&mut ActorData> {
        self.actors.get_mut(id).ok_or(ObjectError::InvalidActorId)
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    /// Move an actor under `new_parent`, or make it a root with `None`.
    pub fn set_parent(&mut self, id: ActorId, new_parent: Option<ActorId>) -> ObjectResult<()> {
        self.data(id)?;
        if let Some(parent_id) = new_parent {
            self.data(parent_id)?;
            if self.is_ancestor_of(id, parent_id) {
                return Err(ObjectError::CircularParentage);
            }
        }

        let old_parent = self.data(id)?.parent;
        if old_parent == new_parent {
            return Ok(());
        }
        if let Some(old_parent_id) = old_parent
            && let Some(parent_data) = self.actors.get_mut(old_parent_id)
        {
            parent_data.children.retain(|&child| child != id);
        }

        let data = self.data_mut(id)?;
        data.parent = new_parent;
        data.style_dirty = true;

        if let Some(parent_id) = new_parent {
            self.data_mut(parent_id)?.children.push(id);
        }
        Ok(())
    }

    /// Check if `potential_ancestor` is `id` or one of its ancestors.
    fn is_ancestor_of(&self, potential_ancestor: ActorId, id: ActorId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == potential_ancestor {
                return true;
            }
            current = self.actors.get(current_id).and_then(|d| d.parent);
        }
        false
    }

    /// The actor's parent.
    pub fn parent(&self, id: ActorId) -> ObjectResult<Option<ActorId>> {
        self.data(id).map(|d| d.parent)
    }

    /// The actor's children in insertion order.
    pub fn children(&self, id: ActorId) -> ObjectResult<&[ActorId]> {
        self.data(id).map(|d| d.children.as_slice())
    }

    /// All actors without a parent.
    pub fn roots(&self) -> Vec<ActorId> {
        self.actors
            .iter()
            .filter(|(_, d)| d.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Ancestors from immediate parent up to the root.
    pub fn ancestors(&self, id: ActorId) -> ObjectResult<Vec<ActorId>> {
        let mut result = Vec::new();
        let mut current = self.data(id)?.parent;
        while let Some(current_id) = current {
            result.push(current_id);
            current = self.actors.get(current_id).and_then(|d| d.parent);
        }
        Ok(result)
    }

    /// Depth-first pre-order traversal: the actor, then each child subtree.
    pub fn depth_first_preorder(&self, id: ActorId) -> ObjectResult<Vec<ActorId>> {
        let mut result = Vec::new();
        self.depth_first_preorder_recursive(id, &mut result)?;
        Ok(result)
    }

    fn depth_first_preorder_recursive(
        &self,
        id: ActorId,
        result: &mut Vec<ActorId>,
    ) -> ObjectResult<()> {
        let data = self.data(id)?;
        result.push(id);
        for &child_id in &data.children {
            self.depth_first_preorder_recursive(child_id, result)?;
        }
        Ok(())
    }

    // =========================================================================
    // Identity: name, classes, pseudo-classes
    // =========================================================================

    /// Set or clear the actor's name (its `#id` in selectors).
    pub fn set_name(&mut self, id: ActorId, name: Option<&str>) -> ObjectResult<()> {
        let data = self.data_mut(id)?;
        let name = name.filter(|n| !n.is_empty()).map(str::to_string);
        if data.name != name {
            data.name = name;
            data.style_dirty = true;
        }
        Ok(())
    }

    /// Add a style class. Returns `false` if it was already present.
    pub fn add_class(&mut self, id: ActorId, class: &str) -> ObjectResult<bool> {
        let data = self.data_mut(id)?;
        Ok(add_label(&mut data.classes, class, &mut data.style_dirty))
    }

    /// Remove a style class. Returns `false` if it was not present.
    pub fn remove_class(&mut self, id: ActorId, class: &str) -> ObjectResult<bool> {
        let data = self.data_mut(id)?;
        Ok(remove_label(&mut data.classes, class, &mut data.style_dirty))
    }

    /// Replace all classes with the whitespace separated list in `classes`.
    pub fn set_classes_from_str(&mut self, id: ActorId, classes: &str) -> ObjectResult<()> {
        let data = self.data_mut(id)?;
        let mut parsed: Vec<String> = Vec::new();
        for class in classes.split_whitespace() {
            if !parsed.iter().any(|c| c == class) {
                parsed.push(class.to_string());
            }
        }
        if data.classes != parsed {
            data.classes = parsed;
            data.style_dirty = true;
        }
        Ok(())
    }

    /// Add a pseudo-class. Returns `false` if it was already present.
    pub fn add_pseudo_class(&mut self, id: ActorId, pseudo: &str) -> ObjectResult<bool> {
        let data = self.data_mut(id)?;
        Ok(add_label(&mut data.pseudo_classes, pseudo, &mut data.style_dirty))
    }

    /// Remove a pseudo-class. Returns `false` if it was not present.
    pub fn remove_pseudo_class(&mut self, id: ActorId, pseudo: &str) -> ObjectResult<bool> {
        let data = self.data_mut(id)?;
        Ok(remove_label(
            &mut data.pseudo_classes,
            pseudo,
            &mut data.style_dirty,
        ))
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Current value of a stylable property.
    pub fn property(&self, id: ActorId, name: &str) -> ObjectResult<&Value> {
        let data = self.data(id)?;
        data.properties.get(name).ok_or_else(|| {
            PropertyError::NotFound {
                type_name: data.type_name.clone(),
                property: name.to_string(),
            }
            .into()
        })
    }

    /// Set a stylable property. The value must match the declared kind.
    ///
    /// Returns whether the stored value changed.
    pub fn set_property(&mut self, id: ActorId, name: &str, value: Value) -> ObjectResult<bool> {
        let data = self.data(id)?;
        let spec = self.types.find_property(&data.type_name, name).ok_or_else(|| {
            PropertyError::NotFound {
                type_name: data.type_name.clone(),
                property: name.to_string(),
            }
        })?;
        if !spec.kind.accepts(&value) {
            return Err(PropertyError::TypeMismatch {
                property: name.to_string(),
                expected: spec.kind.type_name().to_string(),
                got: value.tag().as_str(),
            }
            .into());
        }
        self.store_property(id, name, value)
    }

    /// Reset a stylable property to its registered default.
    pub fn reset_property(&mut self, id: ActorId, name: &str) -> ObjectResult<bool> {
        let data = self.data(id)?;
        let default = self
            .types
            .find_property(&data.type_name, name)
            .map(|spec| spec.default.clone())
            .ok_or_else(|| PropertyError::NotFound {
                type_name: data.type_name.clone(),
                property: name.to_string(),
            })?;
        self.store_property(id, name, default)
    }

    fn store_property(&mut self, id: ActorId, name: &str, value: Value) -> ObjectResult<bool> {
        let data = self.data_mut(id)?;
        if data.properties.get(name) == Some(&value) {
            return Ok(false);
        }
        data.properties.insert(name.to_string(), value);
        tracing::trace!(target: "xfdashboard_core::object", ?id, property = name, "property changed");

        if data.freeze_count > 0 {
            if !data.pending_notify.iter().any(|p| p == name) {
                data.pending_notify.push(name.to_string());
            }
        } else {
            self.property_changed.emit((id, name.to_string()));
        }
        Ok(true)
    }

    /// Start collecting property-change notifications. Calls nest.
    pub fn freeze_notify(&mut self, id: ActorId) -> ObjectResult<()> {
        self.data_mut(id)?.freeze_count += 1;
        Ok(())
    }

    /// Release one freeze level; the outermost release emits every collected
    /// notification once, in the order the properties first changed.
    pub fn thaw_notify(&mut self, id: ActorId) -> ObjectResult<()> {
        let data = self.data_mut(id)?;
        if data.freeze_count == 0 {
            tracing::warn!(target: "xfdashboard_core::object", ?id, "thaw_notify without matching freeze_notify");
            return Ok(());
        }
        data.freeze_count -= 1;
        if data.freeze_count > 0 {
            return Ok(());
        }

        let pending = std::mem::take(&mut data.pending_notify);
        for name in pending {
            self.property_changed.emit((id, name));
        }
        Ok(())
    }

    // =========================================================================
    // Style bookkeeping
    // =========================================================================

    /// The style map most recently applied to the actor.
    pub fn applied_style(&self, id: ActorId) -> ObjectResult<&AppliedStyle> {
        self.data(id).map(|d| &d.applied_style)
    }

    /// Replace the stored applied style, returning the previous one.
    pub fn replace_applied_style(
        &mut self,
        id: ActorId,
        style: AppliedStyle,
    ) -> ObjectResult<AppliedStyle> {
        Ok(std::mem::replace(&mut self.data_mut(id)?.applied_style, style))
    }

    /// Whether the actor needs a restyle.
    pub fn is_style_dirty(&self, id: ActorId) -> ObjectResult<bool> {
        self.data(id).map(|d| d.style_dirty)
    }

    /// Request a restyle of the actor and its subtree.
    pub fn invalidate_style(&mut self, id: ActorId) -> ObjectResult<()> {
        self.data_mut(id)?.style_dirty = true;
        Ok(())
    }

    /// Request a restyle of every actor, e.g. after stylesheets changed.
    pub fn invalidate_all(&mut self) {
        for (_, data) in self.actors.iter_mut() {
            data.style_dirty = true;
        }
    }

    /// Clear the dirty flag of the actor only.
    pub fn clear_style_dirty(&mut self, id: ActorId) -> ObjectResult<()> {
        self.data_mut(id)?.style_dirty = false;
        Ok(())
    }

    /// Dirty actors that have no dirty ancestor.
    ///
    /// Restyling these recursively covers every dirty actor exactly once.
    pub fn dirty_roots(&self) -> Vec<ActorId> {
        self.actors
            .iter()
            .filter(|(_, data)| data.style_dirty)
            .filter(|(id, _)| {
                let mut current = self.actors.get(*id).and_then(|d| d.parent);
                while let Some(parent_id) = current {
                    match self.actors.get(parent_id) {
                        Some(parent) if parent.style_dirty => return false,
                        Some(parent) => current = parent.parent,
                        None => break,
                    }
                }
                true
            })
            .map(|(id, _)| id)
            .collect()
    }

    // =========================================================================
    // Debug / Diagnostics
    // =========================================================================

    /// Debug dump of a subtree with type, name, classes and pseudo-classes.
    pub fn dump_tree(&self, root: ActorId) -> ObjectResult<String> {
        ActorTreeDebug::new().format_subtree(self, root)
    }
}

impl fmt::Debug for ActorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorTree")
            .field("actors", &self.actors.len())
            .finish_non_exhaustive()
    }
}

fn add_label(labels: &mut Vec<String>, label: &str, dirty: &mut bool) -> bool {
    if label.is_empty() || labels.iter().any(|l| l == label) {
        return false;
    }
    labels.push(label.to_string());
    *dirty = true;
    true
}

fn remove_label(labels: &mut Vec<String>, label: &str, dirty: &mut bool) -> bool {
    let before = labels.len();
    labels.retain(|l| l != label);
    let removed = labels.len() != before;
    if removed {
        *dirty = true;
    }
    removed
}

/// Borrowed view of one actor, implementing [`Stylable`].
#[derive(Clone, Copy)]
pub struct ActorRef<'a> {
    tree: &'a ActorTree,
    id: ActorId,
}

impl<'a> ActorRef<'a> {
    /// The actor's ID.
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// The tree the actor lives in.
    pub fn tree(&self) -> &'a ActorTree {
        self.tree
    }

    fn data(&self) -> Option<&'a ActorData> {
        self.tree.actors.get(self.id)
    }
}

impl Stylable for ActorRef<'_> {
    fn type_name(&self) -> &str {
        self.data().map(|d| d.type_name.as_str()).unwrap_or_default()
    }

    fn type_chain(&self) -> Vec<&str> {
        self.tree.types.type_chain(self.type_name())
    }

    fn name(&self) -> Option<&str> {
        self.data().and_then(|d| d.name.as_deref())
    }

    fn classes(&self) -> &[String] {
        self.data().map(|d| d.classes.as_slice()).unwrap_or_default()
    }

    fn pseudo_classes(&self) -> &[String] {
        self.data()
            .map(|d| d.pseudo_classes.as_slice())
            .unwrap_or_default()
    }

    fn parent(&self) -> Option<Self> {
        self.data()
            .and_then(|d| d.parent)
            .map(|id| ActorRef {
                tree: self.tree,
                id,
            })
    }
}

impl fmt::Debug for ActorRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorRef")
            .field("id", &self.id)
            .field("type", &self.type_name())
            .field("name", &self.name())
            .finish()
    }
}

static_assertions::assert_impl_all!(ActorTree: Send, Sync);
static_assertions::assert_impl_all!(ActorRef<'static>: Send, Sync, Copy);
