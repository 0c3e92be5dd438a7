//! Error types for the theming engine.

use std::path::PathBuf;

/// Result type alias for theme operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the theming engine.
///
/// Structural errors ([`Parse`](Error::Parse), [`Import`](Error::Import),
/// [`Io`](Error::Io)) abort loading of a whole stylesheet. Value errors
/// ([`Function`](Error::Function), [`UnresolvableIdentifier`](Error::UnresolvableIdentifier),
/// [`Recursion`](Error::Recursion), [`RecursionLimit`](Error::RecursionLimit),
/// [`ValueTooLong`](Error::ValueTooLong), [`Conversion`](Error::Conversion)) only drop the single property being
/// computed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Stylesheet syntax error.
    #[error("{source_name}:{line}:{column}: {message}")]
    Parse {
        source_name: String,
        line: u32,
        column: u32,
        message: String,
    },

    /// An imported stylesheet could not be read.
    #[error("{from}:{line}:{column}: failed to import '{}': {source}", path.display())]
    Import {
        path: PathBuf,
        from: String,
        line: u32,
        column: u32,
        #[source]
        source: std::io::Error,
    },

    /// A stylesheet imports itself, directly or through other files.
    #[error("Import cycle through '{}'", path.display())]
    ImportCycle { path: PathBuf },

    /// File I/O error.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A style function was called with bad arguments.
    #[error("{function}(): {message}")]
    Function { function: String, message: String },

    /// `@name` does not name a constant.
    #[error("Unresolvable identifier '@{name}'")]
    UnresolvableIdentifier { name: String },

    /// `@name` refers back to itself.
    #[error("Indefinite recursion resolving '@{name}'")]
    Recursion { name: String },

    /// Resolution nested deeper than the configured ceiling.
    #[error("Resolution exceeded the recursion limit of {limit}")]
    RecursionLimit { limit: usize },

    /// A resolved value grew past the length limit.
    #[error("Resolved value exceeds {limit} bytes")]
    ValueTooLong { limit: usize },

    /// A resolved value does not convert to the property's kind.
    #[error("Cannot convert '{value}' for property '{property}': {message}")]
    Conversion {
        property: String,
        value: String,
        message: String,
    },

    /// The property is not stylable on the actor's type.
    #[error("Type '{type_name}' has no stylable property '{property}'")]
    UnknownProperty { type_name: String, property: String },

    /// The theme manifest is malformed.
    #[error("Invalid theme manifest '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The actor tree rejected an operation.
    #[error(transparent)]
    Object(#[from] xfdashboard_core::ObjectError),

    /// Hot-reload error.
    #[cfg(feature = "hot-reload")]
    #[error("Hot-reload error: {0}")]
    HotReload(String),
}

impl Error {
    /// Create a parse error.
    pub fn parse(source_name: impl Into<String>, line: u32, column: u32, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            line,
            column,
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a function error.
    pub fn function(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Function {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Whether this is one of the recursion errors.
    pub fn is_recursion(&self) -> bool {
        matches!(self, Self::Recursion { .. } | Self::RecursionLimit { .. })
    }

    /// Whether this error aborts loading a stylesheet, as opposed to
    /// dropping a single property value.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::Import { .. } | Self::ImportCycle { .. } | Self::Io { .. }
        )
    }
}
