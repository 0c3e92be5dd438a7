//! Logging and debugging facilities.
//!
//! Xfdashboard uses the `tracing` crate for instrumentation. Install a
//! subscriber in the host application to see logs:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("xfdashboard_theme=debug,xfdashboard_core=info")
//!     .init();
//! ```
//!
//! [`ActorTreeDebug`] renders an actor subtree together with the identity
//! selectors see, which is the first thing to look at when a rule does not
//! apply where expected.

use std::fmt::Write as _;

use crate::object::{ActorId, ActorTree, ObjectResult};
use crate::stylable::Stylable;

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "xfdashboard_core";
    /// Actor tree target.
    pub const OBJECT: &str = "xfdashboard_core::object";
    /// Signal target.
    pub const SIGNAL: &str = "xfdashboard_core::signal";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
}

/// Configuration for actor tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show actor IDs.
    pub show_ids: bool,
    /// Whether to show classes and pseudo-classes.
    pub show_classes: bool,
    /// Whether to list the last applied style below each actor.
    pub show_style: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_classes: true,
            show_style: false,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Options that include IDs and applied styles.
    pub fn detailed() -> Self {
        Self {
            show_ids: true,
            show_style: true,
            ..Default::default()
        }
    }
}

/// Renders actor subtrees for debugging.
#[derive(Debug, Clone, Default)]
pub struct ActorTreeDebug {
    options: TreeFormatOptions,
}

impl ActorTreeDebug {
    /// A renderer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// A renderer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format every root of the tree.
    pub fn format_all(&self, tree: &ActorTree) -> ObjectResult<String> {
        let mut output = format!("Actor Tree ({} actors):\n", tree.actor_count());
        let roots = tree.roots();
        if roots.is_empty() {
            output.push_str("  (empty)\n");
        }
        for root in roots {
            self.format_into(tree, root, &mut Vec::new(), &mut output)?;
        }
        Ok(output)
    }

    /// Format one subtree.
    pub fn format_subtree(&self, tree: &ActorTree, root: ActorId) -> ObjectResult<String> {
        let mut output = String::new();
        self.format_into(tree, root, &mut Vec::new(), &mut output)?;
        Ok(output)
    }

    /// `last` holds, for every ancestor level below the root, whether that
    /// ancestor was the last of its siblings.
    fn format_into(
        &self,
        tree: &ActorTree,
        id: ActorId,
        last: &mut Vec<bool>,
        output: &mut String,
    ) -> ObjectResult<()> {
        if self.options.max_depth.is_some_and(|max| last.len() > max) {
            return Ok(());
        }

        let actor = tree.actor(id)?;
        output.push_str(&self.prefix(last));
        output.push_str(actor.type_name());
        if let Some(name) = actor.name() {
            let _ = write!(output, "#{name}");
        }
        if self.options.show_classes {
            for class in actor.classes() {
                let _ = write!(output, ".{class}");
            }
            for pseudo in actor.pseudo_classes() {
                let _ = write!(output, ":{pseudo}");
            }
        }
        if self.options.show_ids {
            let _ = write!(output, " [{id:?}]");
        }
        output.push('\n');

        if self.options.show_style {
            let indent = self.continuation(last);
            for (key, value) in tree.applied_style(id)? {
                let _ = writeln!(output, "{indent}    {key}: {value};");
            }
        }

        let children = tree.children(id)?;
        let count = children.len();
        for (i, &child) in children.iter().enumerate() {
            last.push(i + 1 == count);
            let result = self.format_into(tree, child, last, output);
            last.pop();
            result?;
        }
        Ok(())
    }

    fn glyphs(&self) -> (&'static str, &'static str, &'static str) {
        match self.options.style {
            TreeStyle::Ascii => ("|   ", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}   ", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
        }
    }

    fn prefix(&self, last: &[bool]) -> String {
        let Some((&is_last, parents)) = last.split_last() else {
            return String::new();
        };
        let (branch, tee, corner) = self.glyphs();
        let mut prefix = String::new();
        for &parent_last in parents {
            prefix.push_str(if parent_last { "    " } else { branch });
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix
    }

    fn continuation(&self, last: &[bool]) -> String {
        let (branch, _, _) = self.glyphs();
        last.iter()
            .map(|&l| if l { "    " } else { branch })
            .collect()
    }
}
