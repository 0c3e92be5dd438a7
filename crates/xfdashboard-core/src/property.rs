//! Per-type registry of stylable properties.
//!
//! Types are registered explicitly with an optional parent type, forming a
//! single-inheritance hierarchy. Each type opts properties into theming with
//! [`TypeRegistry::install_property`]; lookups walk the type chain so that a
//! subtype sees every property of its supertypes, with its own declarations
//! shadowing inherited ones of the same name.
//!
//! # Example
//!
//! ```
//! use xfdashboard_core::{PropertySpec, TypeRegistry, Value, ValueKind};
//!
//! let mut types = TypeRegistry::new();
//! types.register_type("Actor", None).unwrap();
//! types.register_type("Button", Some("Actor")).unwrap();
//! types
//!     .install_property("Actor", PropertySpec::new("opacity", ValueKind::Float, 1.0))
//!     .unwrap();
//!
//! assert_eq!(types.type_chain("Button"), vec!["Button", "Actor"]);
//! assert!(types.find_property("Button", "opacity").is_some());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::value::{Value, ValueKind};

/// Declaration of one stylable property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    /// Property name as written in stylesheets.
    pub name: String,
    /// Native kind.
    pub kind: ValueKind,
    /// Value the property starts with and is reset to.
    pub default: Value,
}

impl PropertySpec {
    /// Create a property declaration.
    pub fn new(name: impl Into<String>, kind: ValueKind, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            default: default.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct TypeInfo {
    parent: Option<String>,
    properties: BTreeMap<String, PropertySpec>,
}

/// Registry of actor types and their stylable properties.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeInfo>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, optionally deriving from an already registered parent.
    pub fn register_type(&mut self, name: &str, parent: Option<&str>) -> PropertyResult<()> {
        if self.types.contains_key(name) {
            return Err(PropertyError::DuplicateType {
                name: name.to_string(),
            });
        }
        if let Some(parent) = parent
            && !self.types.contains_key(parent)
        {
            return Err(PropertyError::UnknownType {
                name: parent.to_string(),
            });
        }

        self.types.insert(
            name.to_string(),
            TypeInfo {
                parent: parent.map(str::to_string),
                properties: BTreeMap::new(),
            },
        );
        tracing::trace!(target: "xfdashboard_core::object", type_name = name, ?parent, "registered type");
        Ok(())
    }

    /// Whether `name` is a registered type.
    pub fn contains_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Opt a property into theming for `type_name`.
    ///
    /// The default value must be of the declared kind. Installing the same
    /// name twice on one type is an error; installing a name that a supertype
    /// already declares shadows it.
    pub fn install_property(&mut self, type_name: &str, spec: PropertySpec) -> PropertyResult<()> {
        if !spec.kind.accepts(&spec.default) {
            return Err(PropertyError::TypeMismatch {
                property: spec.name.clone(),
                expected: spec.kind.type_name().to_string(),
                got: spec.default.tag().as_str(),
            });
        }

        let info = self
            .types
            .get_mut(type_name)
            .ok_or_else(|| PropertyError::UnknownType {
                name: type_name.to_string(),
            })?;
        if info.properties.contains_key(&spec.name) {
            return Err(PropertyError::DuplicateProperty {
                type_name: type_name.to_string(),
                property: spec.name,
            });
        }
        info.properties.insert(spec.name.clone(), spec);
        Ok(())
    }

    /// The type itself followed by each supertype, most derived first.
    ///
    /// Unknown types yield an empty chain.
    pub fn type_chain(&self, type_name: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self.types.get_key_value(type_name);
        while let Some((name, info)) = current {
            chain.push(name.as_str());
            current = info
                .parent
                .as_deref()
                .and_then(|p| self.types.get_key_value(p));
        }
        chain
    }

    /// Every stylable property visible on `type_name`, keyed by name.
    pub fn stylable_properties(&self, type_name: &str) -> BTreeMap<&str, &PropertySpec> {
        let mut props = BTreeMap::new();
        // Walk from the root type down so subtypes overwrite.
        for name in self.type_chain(type_name).into_iter().rev() {
            if let Some(info) = self.types.get(name) {
                for (key, spec) in &info.properties {
                    props.insert(key.as_str(), spec);
                }
            }
        }
        props
    }

    /// Look up a single property, honoring shadowing.
    pub fn find_property(&self, type_name: &str, property: &str) -> Option<&PropertySpec> {
        self.type_chain(type_name)
            .into_iter()
            .filter_map(|name| self.types.get(name))
            .find_map(|info| info.properties.get(property))
    }
}

/// Errors from type and property operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// The type is not registered.
    UnknownType {
        /// The missing type name.
        name: String,
    },
    /// The type was registered twice.
    DuplicateType {
        /// The duplicated type name.
        name: String,
    },
    /// The property is not stylable on the given type.
    NotFound {
        /// The type that was searched.
        type_name: String,
        /// The missing property.
        property: String,
    },
    /// A type declared the same property twice.
    DuplicateProperty {
        /// The declaring type.
        type_name: String,
        /// The duplicated property.
        property: String,
    },
    /// A value does not match the property's kind.
    TypeMismatch {
        /// The property being written.
        property: String,
        /// The declared kind.
        expected: String,
        /// The kind of the offered value.
        got: &'static str,
    },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { name } => write!(f, "Type '{}' is not registered", name),
            Self::DuplicateType { name } => write!(f, "Type '{}' is already registered", name),
            Self::NotFound {
                type_name,
                property,
            } => write!(f, "Type '{}' has no stylable property '{}'", type_name, property),
            Self::DuplicateProperty {
                type_name,
                property,
            } => write!(
                f,
                "Property '{}' is already installed on type '{}'",
                property, type_name
            ),
            Self::TypeMismatch {
                property,
                expected,
                got,
            } => write!(
                f,
                "Property '{}' type mismatch: expected {}, got {}",
                property, expected, got
            ),
        }
    }
}

impl std::error::Error for PropertyError {}

/// Result alias for property operations.
pub type PropertyResult<T> = std::result::Result<T, PropertyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn registry() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types.register_type("Actor", None).unwrap();
        types.register_type("Label", Some("Actor")).unwrap();
        types.register_type("Button", Some("Label")).unwrap();
        types
            .install_property("Actor", PropertySpec::new("opacity", ValueKind::Float, 1.0))
            .unwrap();
        types
            .install_property(
                "Label",
                PropertySpec::new("color", ValueKind::Color, Color::WHITE),
            )
            .unwrap();
        types
            .install_property(
                "Button",
                PropertySpec::new("color", ValueKind::Color, Color::BLACK),
            )
            .unwrap();
        types
    }

    #[test]
    fn test_type_chain_most_derived_first() {
        let types = registry();
        assert_eq!(types.type_chain("Button"), vec!["Button", "Label", "Actor"]);
        assert_eq!(types.type_chain("Actor"), vec!["Actor"]);
        assert!(types.type_chain("Nope").is_empty());
    }

    #[test]
    fn test_registration_errors() {
        let mut types = registry();
        assert_eq!(
            types.register_type("Actor", None),
            Err(PropertyError::DuplicateType {
                name: "Actor".into()
            })
        );
        assert_eq!(
            types.register_type("Widget", Some("Missing")),
            Err(PropertyError::UnknownType {
                name: "Missing".into()
            })
        );
        assert!(matches!(
            types.install_property("Actor", PropertySpec::new("opacity", ValueKind::Float, 0.5)),
            Err(PropertyError::DuplicateProperty { .. })
        ));
        assert!(matches!(
            types.install_property("Actor", PropertySpec::new("width", ValueKind::Int, "wide")),
            Err(PropertyError::TypeMismatch { got: "string", .. })
        ));
    }

    #[test]
    fn test_subtype_shadows_supertype() {
        let types = registry();
        let props = types.stylable_properties("Button");
        assert_eq!(props.len(), 2);
        assert_eq!(props["color"].default, Value::Color(Color::BLACK));
        assert_eq!(
            types.find_property("Label", "color").map(|p| &p.default),
            Some(&Value::Color(Color::WHITE))
        );
        assert!(types.find_property("Actor", "color").is_none());
    }
}
