//! Error types for attribute collections

use thiserror::Error;

/// Result type for attribute and collection operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for attribute and collection operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Attribute name is empty or starts with the reserved private prefix
    #[error("Invalid attribute name: {0}")]
    Naming(String),

    /// Value rejected on assignment
    #[error("Value rejected for attribute '{}': {reason}", .name.as_deref().unwrap_or("<unnamed>"))]
    Validation {
        /// Name of the rejecting attribute, if it has one
        name: Option<String>,
        /// Why the value was rejected
        reason: String,
    },

    /// Length constraint violated
    #[error(
        "Value length [{got}] does not match the required length [{expected}] of attribute '{}'",
        .name.as_deref().unwrap_or("<unnamed>")
    )]
    LengthMismatch {
        /// Length of the rejected value
        got: usize,
        /// Required length
        expected: usize,
        /// Name of the attribute or collection key
        name: Option<String>,
    },

    /// Value cannot be turned into an array
    #[error("Cannot coerce value into an array: {0}")]
    Coercion(String),

    /// Bulk update source of an unrecognized kind
    #[error("Unsupported update source: {0}")]
    UnsupportedSource(String),

    /// Unrecognized copy mode token
    #[error("Unknown copy mode '{0}' (expected none, shallow or deep)")]
    InvalidCopyMode(String),

    /// No member with the given name
    #[error("No attribute named '{0}'")]
    MissingAttribute(String),

    /// Element index past the end of an array
    #[error("Index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Array length
        len: usize,
    },

    /// Malformed collection options
    #[error("Invalid collection options: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn validation(name: Option<&str>, reason: impl Into<String>) -> Self {
        Error::Validation {
            name: name.map(str::to_owned),
            reason: reason.into(),
        }
    }
}
