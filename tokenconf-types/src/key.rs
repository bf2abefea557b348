//! Structured addresses for validation findings.

use crate::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a validation finding applies.
///
/// Keys carry the collection name next to the position, so a root field
/// named `"0"` can never collide with the first record of a collection.
/// The position is only valid for the snapshot the key was computed from:
/// after a hard removal the same record sits at a smaller index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ErrorKey {
    /// A field of the root record.
    Root { field: String },
    /// A field of one record in a named collection.
    Record {
        collection: String,
        index: usize,
        id: RecordId,
        field: String,
    },
    /// The collection as a whole (cardinality findings).
    Collection { collection: String },
}

impl ErrorKey {
    pub fn root(field: impl Into<String>) -> Self {
        Self::Root {
            field: field.into(),
        }
    }

    pub fn record(
        collection: impl Into<String>,
        index: usize,
        id: RecordId,
        field: impl Into<String>,
    ) -> Self {
        Self::Record {
            collection: collection.into(),
            index,
            id,
            field: field.into(),
        }
    }

    pub fn collection(collection: impl Into<String>) -> Self {
        Self::Collection {
            collection: collection.into(),
        }
    }

    /// The field this key points at, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Root { field } | Self::Record { field, .. } => Some(field),
            Self::Collection { .. } => None,
        }
    }

    /// The collection this key belongs to; `None` for root fields.
    #[must_use]
    pub fn collection_name(&self) -> Option<&str> {
        match self {
            Self::Root { .. } => None,
            Self::Record { collection, .. } | Self::Collection { collection } => Some(collection),
        }
    }

    /// Record position at the time the key was computed.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Record { index, .. } => Some(*index),
            _ => None,
        }
    }

    #[must_use]
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            Self::Record { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Flat string form used by forms that look errors up as
    /// `"<index>.<field>"` (records) or `"<field>"` (root).
    /// Collection-level keys render as the collection name.
    #[must_use]
    pub fn legacy_key(&self) -> String {
        match self {
            Self::Root { field } => field.clone(),
            Self::Record { index, field, .. } => format!("{index}.{field}"),
            Self::Collection { collection } => collection.clone(),
        }
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root { field } => write!(f, "{field}"),
            Self::Record {
                collection,
                index,
                field,
                ..
            } => write!(f, "{collection}[{index}].{field}"),
            Self::Collection { collection } => write!(f, "{collection}"),
        }
    }
}
