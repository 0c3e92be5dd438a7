//! Hot reload of stylesheets.
//!
//! This module is only available with the `hot-reload` feature. Restyling
//! after a reload is left to the caller:
//!
//! ```ignore
//! let changes = watcher.poll();
//! if watcher.apply_changes(&mut engine, &changes)? > 0 {
//!     tree.invalidate_all();
//!     engine.restyle_invalidated(&mut tree)?;
//! }
//! ```

mod watcher;

pub use watcher::{ChangeKind, StylesheetChangeEvent, StylesheetWatcher};
