//! Core systems for Xfdashboard.
//!
//! This crate provides what the theming engine styles:
//!
//! - **Actor tree**: arena-owned actors with names, style classes,
//!   pseudo-classes and parent/child links ([`ActorTree`])
//! - **Type registry**: explicit per-type registration of stylable
//!   properties with defaults ([`TypeRegistry`])
//! - **Values**: a tagged [`Value`] type and string converters ([`Converters`])
//! - **Colors**: RGBA parsing, formatting and HLS shading ([`Color`])
//! - **Signals**: batched property-change notification ([`Signal`])
//!
//! # Example
//!
//! ```
//! use xfdashboard_core::{ActorTree, Converters, PropertySpec, TypeRegistry, Value, ValueKind};
//!
//! let mut types = TypeRegistry::new();
//! types.register_type("Actor", None).unwrap();
//! types
//!     .install_property("Actor", PropertySpec::new("opacity", ValueKind::Float, 1.0))
//!     .unwrap();
//!
//! let mut tree = ActorTree::new(types);
//! let actor = tree.create_actor("Actor").unwrap();
//!
//! let value = Converters::default().convert("0.5", &ValueKind::Float).unwrap();
//! tree.set_property(actor, "opacity", value).unwrap();
//! assert_eq!(tree.property(actor, "opacity").unwrap(), &Value::Float(0.5));
//! ```

pub mod color;
pub mod logging;
pub mod object;
pub mod property;
pub mod signal;
mod stylable;
pub mod value;

pub use color::Color;
pub use logging::{ActorTreeDebug, TreeFormatOptions, TreeStyle};
pub use object::{ActorId, ActorRef, ActorTree, AppliedStyle, ObjectError, ObjectResult};
pub use property::{PropertyError, PropertyResult, PropertySpec, TypeRegistry};
pub use signal::{ConnectionId, Signal};
pub use stylable::Stylable;
pub use value::{
    ConversionError, ConverterFn, Converters, EnumEntry, EnumSpec, FlagsSpec, KindTag, Value,
    ValueKind, unquote,
};
