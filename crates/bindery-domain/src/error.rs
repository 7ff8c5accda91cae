//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Bindery
///
/// Graph problems (missing bindings, cycles, duplicates) are never errors of this
/// type: they are reported as diagnostics. This enum covers malformed input and
/// failures reading it.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (with context)
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// A type name could not be parsed
    #[error("Invalid type name '{input}': {reason}")]
    InvalidTypeName {
        /// The text that failed to parse
        input: String,
        /// Why parsing failed
        reason: String,
    },

    /// A declaration handed over by the scanner is structurally invalid
    #[error("Invalid declaration: {message}")]
    InvalidDeclaration {
        /// Description of the problem
        message: String,
    },

    /// A component id does not exist in the tree
    #[error("Unknown component: {component}")]
    UnknownComponent {
        /// The offending id or name
        component: String,
    },
}

// Declaration error creation methods
impl Error {
    /// Create an invalid type name error
    pub fn invalid_type_name<S: Into<String>, R: Into<String>>(input: S, reason: R) -> Self {
        Self::InvalidTypeName {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid declaration error
    pub fn invalid_declaration<S: Into<String>>(message: S) -> Self {
        Self::InvalidDeclaration {
            message: message.into(),
        }
    }

    /// Create an unknown component error
    pub fn unknown_component<S: Into<String>>(component: S) -> Self {
        Self::UnknownComponent {
            component: component.into(),
        }
    }
}

// I/O error creation methods
impl Error {
    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

