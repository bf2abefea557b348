//! Configuration model for the token configuration editor.
//!
//! Defines the shapes every editor component agrees on:
//! - [`Record`]: one field map plus a stable id and soft-delete marker
//! - [`Collection`]: an ordered, named sequence of records with a declared [`DeletePolicy`]
//! - [`Snapshot`]: the immutable point-in-time view of root + collections
//! - [`EditorSchema`]: declared collections, defaults, JSON-text fields and rules
//! - [`ValidationHook`]: optional trait for domain checks beyond the built-in rules
//!
//! The mutation, validation and assembly machinery lives in `tokenconf-editor`.

mod collection;
mod error;
mod handler;
mod record;
mod schema;
mod snapshot;

pub use collection::{Collection, DeletePolicy};
pub use error::{RecordError, SchemaError, SchemaResult};
pub use handler::{Finding, ValidationHook};
pub use record::{DELETED_MARKER, Fields, ID_MARKER, Record, json_kind};
pub use schema::{Check, CollectionSpec, EditorSchema, FieldRule, RootSpec, Severity};
pub use snapshot::Snapshot;

pub use tokenconf_types::{ErrorKey, RecordId};

/// Pseudo-field that appends a record instead of writing a value.
pub const NEW_RECORD: &str = "newRecord";

/// Pseudo-field that removes the addressed record instead of writing a value.
pub const REMOVE_RECORD: &str = "removeRecord";
