//! Tagged property values and string conversion.
//!
//! Stylesheets only ever produce text. Before a resolved value can be stored
//! on an actor it is converted to the native kind of the target property by
//! one of the converter functions held in a [`Converters`] table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::color::Color;

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text.
    String(String),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// RGBA color.
    Color(Color),
    /// Numeric value of an enumeration entry.
    Enum(i64),
    /// Bitwise OR of flag values.
    Flags(u64),
}

impl Value {
    /// The kind tag of this value.
    pub fn tag(&self) -> KindTag {
        match self {
            Value::String(_) => KindTag::String,
            Value::Int(_) => KindTag::Int,
            Value::Float(_) => KindTag::Float,
            Value::Bool(_) => KindTag::Bool,
            Value::Color(_) => KindTag::Color,
            Value::Enum(_) => KindTag::Enum,
            Value::Flags(_) => KindTag::Flags,
        }
    }

    /// Returns the string, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the number, converting integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the color, if this is a color value.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Color(c) => write!(f, "{c}"),
            Value::Enum(v) => write!(f, "enum({v})"),
            Value::Flags(v) => write!(f, "flags({v:#x})"),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Value::Color(v)
    }
}

/// Discriminant of a [`ValueKind`], used to key converter tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindTag {
    String,
    Int,
    Float,
    Bool,
    Color,
    Enum,
    Flags,
}

impl KindTag {
    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            KindTag::String => "string",
            KindTag::Int => "int",
            KindTag::Float => "float",
            KindTag::Bool => "bool",
            KindTag::Color => "color",
            KindTag::Enum => "enum",
            KindTag::Flags => "flags",
        }
    }
}

/// The native kind of a stylable property.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    String,
    Int,
    Float,
    Bool,
    Color,
    Enum(Arc<EnumSpec>),
    Flags(Arc<FlagsSpec>),
}

impl ValueKind {
    /// The kind tag.
    pub fn tag(&self) -> KindTag {
        match self {
            ValueKind::String => KindTag::String,
            ValueKind::Int => KindTag::Int,
            ValueKind::Float => KindTag::Float,
            ValueKind::Bool => KindTag::Bool,
            ValueKind::Color => KindTag::Color,
            ValueKind::Enum(_) => KindTag::Enum,
            ValueKind::Flags(_) => KindTag::Flags,
        }
    }

    /// Name used in diagnostics, including the enum/flags type name.
    pub fn type_name(&self) -> &str {
        match self {
            ValueKind::Enum(spec) => &spec.name,
            ValueKind::Flags(spec) => &spec.name,
            other => other.tag().as_str(),
        }
    }

    /// Whether `value` can be stored in a property of this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueKind::Enum(spec), Value::Enum(v)) => spec.contains(*v),
            (ValueKind::Flags(spec), Value::Flags(v)) => spec.covers(*v),
            (kind, value) => kind.tag() == value.tag(),
        }
    }
}

/// One entry of an enumeration or flags type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry<T> {
    /// Numeric value.
    pub value: T,
    /// Full value name, e.g. `XFDASHBOARD_ORIENTATION_LEFT`.
    pub name: String,
    /// Short nickname, e.g. `left`.
    pub nick: String,
}

/// Definition of an enumeration type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    /// Type name.
    pub name: String,
    /// Entries in declaration order.
    pub entries: Vec<EnumEntry<i64>>,
}

impl EnumSpec {
    /// Start an enumeration definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Add an entry.
    pub fn entry(mut self, value: i64, name: impl Into<String>, nick: impl Into<String>) -> Self {
        self.entries.push(EnumEntry {
            value,
            name: name.into(),
            nick: nick.into(),
        });
        self
    }

    /// Find a value by name or nickname (case-insensitive).
    pub fn lookup(&self, text: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|e| e.nick.eq_ignore_ascii_case(text) || e.name.eq_ignore_ascii_case(text))
            .map(|e| e.value)
    }

    /// Whether `value` is a declared entry.
    pub fn contains(&self, value: i64) -> bool {
        self.entries.iter().any(|e| e.value == value)
    }
}

/// Definition of a flags type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagsSpec {
    /// Type name.
    pub name: String,
    /// Single-bit (or composite) entries.
    pub entries: Vec<EnumEntry<u64>>,
}

impl FlagsSpec {
    /// Start a flags definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Add an entry.
    pub fn entry(mut self, value: u64, name: impl Into<String>, nick: impl Into<String>) -> Self {
        self.entries.push(EnumEntry {
            value,
            name: name.into(),
            nick: nick.into(),
        });
        self
    }

    /// Find a flag by name or nickname (case-insensitive).
    pub fn lookup(&self, text: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.nick.eq_ignore_ascii_case(text) || e.name.eq_ignore_ascii_case(text))
            .map(|e| e.value)
    }

    /// Whether every bit of `value` belongs to a declared flag.
    pub fn covers(&self, value: u64) -> bool {
        let all = self.entries.iter().fold(0u64, |acc, e| acc | e.value);
        value & !all == 0
    }
}

/// A string could not be converted to the requested kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    /// The offending text.
    pub value: String,
    /// Target kind name.
    pub target: String,
    /// What went wrong.
    pub reason: String,
}

impl ConversionError {
    fn new(value: &str, kind: &ValueKind, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            target: kind.type_name().to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot convert '{}' to {}: {}",
            self.value, self.target, self.reason
        )
    }
}

impl std::error::Error for ConversionError {}

/// Signature of a string-to-value converter.
pub type ConverterFn = fn(&str, &ValueKind) -> Result<Value, ConversionError>;

/// Converter functions keyed by target kind.
#[derive(Debug, Clone)]
pub struct Converters {
    table: HashMap<KindTag, ConverterFn>,
}

impl Converters {
    /// An empty table. Use [`Converters::default`] for the built-in set.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Register (or replace) the converter for a kind.
    pub fn register(&mut self, tag: KindTag, converter: ConverterFn) {
        self.table.insert(tag, converter);
    }

    /// Convert `text` to a value of `kind`.
    pub fn convert(&self, text: &str, kind: &ValueKind) -> Result<Value, ConversionError> {
        let converter = self
            .table
            .get(&kind.tag())
            .ok_or_else(|| ConversionError::new(text, kind, "no converter registered"))?;
        converter(text.trim(), kind)
    }
}

impl Default for Converters {
    fn default() -> Self {
        let mut converters = Self::empty();
        converters.register(KindTag::String, convert_string);
        converters.register(KindTag::Int, convert_int);
        converters.register(KindTag::Float, convert_float);
        converters.register(KindTag::Bool, convert_bool);
        converters.register(KindTag::Color, convert_color);
        converters.register(KindTag::Enum, convert_enum);
        converters.register(KindTag::Flags, convert_flags);
        converters
    }
}

/// Remove one pair of matching surrounding quotes.
pub fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
            return &text[1..text.len() - 1];
        }
    }
    text
}

fn convert_string(text: &str, _kind: &ValueKind) -> Result<Value, ConversionError> {
    Ok(Value::String(unquote(text).to_string()))
}

fn convert_int(text: &str, kind: &ValueKind) -> Result<Value, ConversionError> {
    text.parse::<i64>()
        .map(Value::Int)
        .map_err(|e| ConversionError::new(text, kind, e.to_string()))
}

fn convert_float(text: &str, kind: &ValueKind) -> Result<Value, ConversionError> {
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|e| ConversionError::new(text, kind, e.to_string()))
}

fn convert_bool(text: &str, kind: &ValueKind) -> Result<Value, ConversionError> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
        "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
        _ => Err(ConversionError::new(text, kind, "expected a boolean")),
    }
}

fn convert_color(text: &str, kind: &ValueKind) -> Result<Value, ConversionError> {
    Color::parse(unquote(text))
        .map(Value::Color)
        .ok_or_else(|| ConversionError::new(text, kind, "unknown color format"))
}

fn convert_enum(text: &str, kind: &ValueKind) -> Result<Value, ConversionError> {
    let ValueKind::Enum(spec) = kind else {
        return Err(ConversionError::new(text, kind, "not an enumeration"));
    };
    let text = unquote(text);
    if let Some(value) = spec.lookup(text) {
        return Ok(Value::Enum(value));
    }
    match text.parse::<i64>() {
        Ok(value) if spec.contains(value) => Ok(Value::Enum(value)),
        _ => Err(ConversionError::new(text, kind, "no such enumeration value")),
    }
}

fn convert_flags(text: &str, kind: &ValueKind) -> Result<Value, ConversionError> {
    let ValueKind::Flags(spec) = kind else {
        return Err(ConversionError::new(text, kind, "not a flags type"));
    };

    let mut flags = 0u64;
    for part in unquote(text)
        .split(|c: char| c == '|' || c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
    {
        let value = match spec.lookup(part) {
            Some(value) => value,
            None => part
                .parse::<u64>()
                .ok()
                .filter(|v| spec.covers(*v))
                .ok_or_else(|| {
                    ConversionError::new(text, kind, format!("unknown flag '{part}'"))
                })?,
        };
        flags |= value;
    }
    Ok(Value::Flags(flags))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orientation() -> Arc<EnumSpec> {
        Arc::new(
            EnumSpec::new("XfdashboardOrientation")
                .entry(0, "XFDASHBOARD_ORIENTATION_LEFT", "left")
                .entry(1, "XFDASHBOARD_ORIENTATION_RIGHT", "right")
                .entry(2, "XFDASHBOARD_ORIENTATION_TOP", "top"),
        )
    }

    fn corners() -> Arc<FlagsSpec> {
        Arc::new(
            FlagsSpec::new("XfdashboardCorners")
                .entry(1, "XFDASHBOARD_CORNERS_TOP_LEFT", "top-left")
                .entry(2, "XFDASHBOARD_CORNERS_TOP_RIGHT", "top-right")
                .entry(4, "XFDASHBOARD_CORNERS_BOTTOM_LEFT", "bottom-left")
                .entry(8, "XFDASHBOARD_CORNERS_BOTTOM_RIGHT", "bottom-right"),
        )
    }

    #[test]
    fn scalar_conversions() {
        let conv = Converters::default();
        assert_eq!(conv.convert("42", &ValueKind::Int), Ok(Value::Int(42)));
        assert_eq!(conv.convert(" 0.8 ", &ValueKind::Float), Ok(Value::Float(0.8)));
        assert_eq!(conv.convert("Yes", &ValueKind::Bool), Ok(Value::Bool(true)));
        assert_eq!(
            conv.convert("\"Sans 12\"", &ValueKind::String),
            Ok(Value::String("Sans 12".into()))
        );
        assert!(conv.convert("4.5", &ValueKind::Int).is_err());
        assert!(conv.convert("maybe", &ValueKind::Bool).is_err());
    }

    #[test]
    fn color_conversion() {
        let conv = Converters::default();
        assert_eq!(
            conv.convert("#ff000080", &ValueKind::Color),
            Ok(Value::Color(Color::new(255, 0, 0, 128)))
        );
        let err = conv.convert("bogus", &ValueKind::Color).unwrap_err();
        assert_eq!(err.target, "color");
    }

    #[test]
    fn enum_by_name_nick_or_number() {
        let conv = Converters::default();
        let kind = ValueKind::Enum(orientation());
        assert_eq!(conv.convert("right", &kind), Ok(Value::Enum(1)));
        assert_eq!(
            conv.convert("XFDASHBOARD_ORIENTATION_TOP", &kind),
            Ok(Value::Enum(2))
        );
        assert_eq!(conv.convert("0", &kind), Ok(Value::Enum(0)));
        assert!(conv.convert("7", &kind).is_err());
        assert!(conv.convert("sideways", &kind).is_err());
    }

    #[test]
    fn flags_are_combined() {
        let conv = Converters::default();
        let kind = ValueKind::Flags(corners());
        assert_eq!(
            conv.convert("top-left | bottom-right", &kind),
            Ok(Value::Flags(9))
        );
        assert_eq!(conv.convert("top-left top-right", &kind), Ok(Value::Flags(3)));
        assert!(conv.convert("middle", &kind).is_err());
    }

    #[test]
    fn custom_converter_replaces_builtin() {
        fn always_seven(_: &str, _: &ValueKind) -> Result<Value, ConversionError> {
            Ok(Value::Int(7))
        }
        let mut conv = Converters::default();
        conv.register(KindTag::Int, always_seven);
        assert_eq!(conv.convert("1", &ValueKind::Int), Ok(Value::Int(7)));
        assert!(Converters::empty().convert("1", &ValueKind::Int).is_err());
    }

    #[test]
    fn kind_accepts_values() {
        assert!(ValueKind::Int.accepts(&Value::Int(1)));
        assert!(!ValueKind::Int.accepts(&Value::Float(1.0)));
        assert!(ValueKind::Enum(orientation()).accepts(&Value::Enum(2)));
        assert!(!ValueKind::Enum(orientation()).accepts(&Value::Enum(9)));
        assert!(ValueKind::Flags(corners()).accepts(&Value::Flags(5)));
        assert!(!ValueKind::Flags(corners()).accepts(&Value::Flags(16)));
    }
}
