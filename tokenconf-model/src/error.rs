//! Error types for schema loading and record decoding.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while loading or checking an [`crate::EditorSchema`].
#[derive(Debug, Error)]
pub enum SchemaError {
    /// IO error reading a schema file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML.
    #[error("schema parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Well-formed but inconsistent schema.
    #[error("invalid schema: {0}")]
    Invalid(String),
}

/// A JSON record that cannot become a [`crate::Record`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record must be an object, got {0}")]
    NotAnObject(&'static str),

    #[error("`_deleted` must be a boolean, got {0}")]
    InvalidDeletedMarker(&'static str),

    #[error("`_id` is not a valid record id: {0}")]
    InvalidId(String),
}
