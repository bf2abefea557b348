//! Error types for the editor core.
//!
//! Only misuse of the dispatch contract is an error. Malformed JSON text and
//! failed validation rules are data: see [`crate::coerce`] and
//! [`crate::ValidationReport`].

use std::collections::BTreeMap;
use thiserror::Error;
use tokenconf_model::{ErrorKey, RecordError, RecordId};

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Contract violations raised by the dispatcher and reducer.
///
/// When one of these is returned the current snapshot is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// Position outside the collection, or an append whose index is not the tail.
    #[error("index {index} out of range for collection '{collection}' (len: {len})")]
    IndexOutOfRange {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Collection not declared in the schema.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    /// Id-addressed mutation whose record is gone.
    #[error("record {id} not found in collection '{collection}'")]
    UnknownRecord { collection: String, id: RecordId },

    /// Indexed mutation with no collection in scope.
    #[error("no collection in scope for indexed mutation of '{0}'")]
    NoActiveCollection(String),

    /// Lifecycle pseudo-field without a record index.
    #[error("'{0}' requires a record index")]
    MissingIndex(String),

    /// `newRecord` contents that are not an object.
    #[error("new record contents must be an object or null, got {0}")]
    InvalidRecord(&'static str),

    /// Write to a name the editor owns.
    #[error("'{0}' is reserved and cannot be written as a field")]
    ReservedField(String),

    /// Initial record that does not decode.
    #[error("invalid record in collection '{collection}': {source}")]
    MalformedRecord {
        collection: String,
        source: RecordError,
    },

    /// Two initial records restored with the same `_id`.
    #[error("record {id} appears twice in collection '{collection}'")]
    DuplicateRecordId { collection: String, id: RecordId },

    /// Schema rejected at editor construction.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Raised by assembly when blocking findings remain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("{count} unresolved validation issue(s)")]
    UnresolvedIssues {
        /// Total number of issue messages.
        count: usize,
        issues: BTreeMap<ErrorKey, Vec<String>>,
    },
}
