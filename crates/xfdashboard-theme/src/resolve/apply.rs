//! Applying computed styles to actors.

use xfdashboard_core::{ActorId, ActorTree, AppliedStyle, Stylable, Value};

use crate::Result;
use crate::resolve::StyleEngine;

impl StyleEngine {
    /// Restyle `actor` and its whole subtree.
    ///
    /// Every actor gets the properties its matching rules set, converted to
    /// the declared kinds. Properties set by the previous application but no
    /// longer styled are reset to their defaults. Change notifications are
    /// batched per actor.
    pub fn apply(&self, tree: &mut ActorTree, actor: ActorId) -> Result<()> {
        for id in tree.depth_first_preorder(actor)? {
            self.apply_one(tree, id)?;
        }
        Ok(())
    }

    /// Restyle every actor marked dirty. Returns the number of subtrees
    /// restyled.
    pub fn restyle_invalidated(&self, tree: &mut ActorTree) -> Result<usize> {
        let roots = tree.dirty_roots();
        for &root in &roots {
            self.apply(tree, root)?;
        }
        if !roots.is_empty() {
            tracing::debug!(target: "xfdashboard_theme::apply", subtrees = roots.len(), "restyled invalidated actors");
        }
        Ok(roots.len())
    }

    fn apply_one(&self, tree: &mut ActorTree, id: ActorId) -> Result<()> {
        let actor = tree.actor(id)?;
        let type_name = actor.type_name().to_string();
        let properties = self.get_properties_for(&actor);

        let stylable = tree.types().stylable_properties(&type_name);
        let mut applied = AppliedStyle::new();
        let mut converted: Vec<(String, Value)> = Vec::new();
        for (name, value) in &properties {
            applied.insert(name.clone(), value.value.clone());
            let Some(spec) = stylable.get(name.as_str()) else {
                continue;
            };
            match self.options.converters.convert(&value.value, &spec.kind) {
                Ok(v) => converted.push((name.clone(), v)),
                Err(e) => tracing::warn!(
                    target: "xfdashboard_theme::apply",
                    actor = %type_name,
                    property = %name,
                    value = %value,
                    error = %e,
                    "cannot convert style value"
                ),
            }
        }
        let stale: Vec<String> = tree
            .applied_style(id)?
            .keys()
            .filter(|name| !applied.contains_key(*name) && stylable.contains_key(name.as_str()))
            .cloned()
            .collect();

        tree.replace_applied_style(id, applied)?;
        tree.freeze_notify(id)?;
        for (name, value) in converted {
            if let Err(e) = tree.set_property(id, &name, value) {
                tracing::warn!(target: "xfdashboard_theme::apply", actor = %type_name, property = %name, error = %e, "cannot set style value");
            }
        }
        for name in stale {
            if let Err(e) = tree.reset_property(id, &name) {
                tracing::warn!(target: "xfdashboard_theme::apply", actor = %type_name, property = %name, error = %e, "cannot reset property");
            }
        }
        tree.thaw_notify(id)?;
        tree.clear_style_dirty(id)?;
        Ok(())
    }
}
