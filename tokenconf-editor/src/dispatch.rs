//! Field-mutation dispatch: one entry point for every form edit.
//!
//! Forms report `(field, value, index?)`. [`Mutation::from_call`] turns that
//! triple into a typed [`Mutation`], and [`dispatch`] applies it to a
//! snapshot, producing the successor snapshot or a contract error.

use crate::error::{EditorError, EditorResult};
use crate::reducer;
use serde_json::Value;
use std::borrow::Cow;
use tokenconf_model::{
    Collection, DELETED_MARKER, DeletePolicy, EditorSchema, Fields, ID_MARKER, NEW_RECORD, REMOVE_RECORD, Record,
    RecordId, Snapshot, json_kind,
};
use tracing::debug;

/// How a mutation addresses a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRef {
    /// Position in the snapshot the mutation is applied to.
    Index(usize),
    /// Stable identity; unaffected by sibling removals.
    Id(RecordId),
}

impl From<usize> for RecordRef {
    fn from(index: usize) -> Self {
        RecordRef::Index(index)
    }
}

impl From<RecordId> for RecordRef {
    fn from(id: RecordId) -> Self {
        RecordRef::Id(id)
    }
}

/// A single edit to the configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// `root[field] = value`.
    SetRoot { field: String, value: Value },
    /// `collection[target][field] = value`.
    SetField {
        collection: String,
        target: RecordRef,
        field: String,
        value: Value,
    },
    /// Append a record at the tail. `index`, when given, must equal the
    /// current length.
    Append {
        collection: String,
        index: Option<usize>,
        defaults: Fields,
    },
    /// Remove a record according to the collection's delete policy.
    Remove { collection: String, target: RecordRef },
}

impl Mutation {
    /// Parses the form-level `(field, value, index?)` call.
    ///
    /// Without an index the call writes a root field. With one it addresses
    /// the record at that position in `scope`, and the pseudo-fields
    /// `newRecord` / `removeRecord` become append / remove.
    pub fn from_call(field: &str, value: Value, index: Option<usize>, scope: Option<&str>) -> EditorResult<Self> {
        let Some(index) = index else {
            return match field {
                NEW_RECORD | REMOVE_RECORD => Err(EditorError::MissingIndex(field.to_string())),
                _ => Ok(Mutation::SetRoot {
                    field: field.to_string(),
                    value,
                }),
            };
        };

        let collection = scope
            .ok_or_else(|| EditorError::NoActiveCollection(field.to_string()))?
            .to_string();

        Ok(match field {
            NEW_RECORD => Mutation::Append {
                collection,
                index: Some(index),
                defaults: record_contents(value)?,
            },
            REMOVE_RECORD => Mutation::Remove {
                collection,
                target: RecordRef::Index(index),
            },
            _ => Mutation::SetField {
                collection,
                target: RecordRef::Index(index),
                field: field.to_string(),
                value,
            },
        })
    }

    /// The collection this mutation touches, if any.
    pub fn collection(&self) -> Option<&str> {
        match self {
            Mutation::SetRoot { .. } => None,
            Mutation::SetField { collection, .. }
            | Mutation::Append { collection, .. }
            | Mutation::Remove { collection, .. } => Some(collection),
        }
    }
}

fn record_contents(value: Value) -> EditorResult<Fields> {
    match value {
        Value::Object(fields) => Ok(fields),
        Value::Null => Ok(Fields::new()),
        other => Err(EditorError::InvalidRecord(json_kind(&other))),
    }
}

/// Applies one mutation, returning the successor snapshot.
///
/// The input snapshot is never modified. Collections the mutation does not
/// touch are shared with the successor. Soft-removing a record that is
/// already removed changes nothing: the result keeps the input's revision.
pub fn dispatch(snapshot: &Snapshot, schema: &EditorSchema, mutation: Mutation) -> EditorResult<Snapshot> {
    match mutation {
        Mutation::SetRoot { field, value } => {
            if field == DELETED_MARKER || field == ID_MARKER || schema.collection_spec(&field).is_some() {
                return Err(EditorError::ReservedField(field));
            }
            debug!(field = %field, "Updating root field");
            let mut root = snapshot.root().clone();
            root.insert(field, value);
            Ok(snapshot.with_root(root))
        }
        Mutation::SetField {
            collection,
            target,
            field,
            value,
        } => {
            if [DELETED_MARKER, ID_MARKER, NEW_RECORD, REMOVE_RECORD].contains(&field.as_str()) {
                return Err(EditorError::ReservedField(field));
            }
            let current = resolve_collection(snapshot, schema, &collection)?;
            debug!(collection = %collection, target = ?target, field = %field, "Updating record field");
            let next = match target {
                RecordRef::Index(index) => reducer::update_at(&current, index, &field, value)?,
                RecordRef::Id(id) => reducer::update_by_id(&current, id, &field, value)?,
            };
            Ok(snapshot.with_collection(next))
        }
        Mutation::Append {
            collection,
            index,
            defaults,
        } => {
            let current = resolve_collection(snapshot, schema, &collection)?;
            if let Some(index) = index {
                if index != current.len() {
                    return Err(EditorError::IndexOutOfRange {
                        collection,
                        index,
                        len: current.len(),
                    });
                }
            }
            let mut contents = schema
                .collection_spec(&collection)
                .map(|spec| spec.defaults.clone())
                .unwrap_or_default();
            contents.extend(defaults);
            contents.remove(DELETED_MARKER);
            contents.remove(ID_MARKER);
            debug!(collection = %collection, position = current.len(), "Appending record");
            Ok(snapshot.with_collection(reducer::append(&current, contents)))
        }
        Mutation::Remove { collection, target } => {
            let current = resolve_collection(snapshot, schema, &collection)?;
            let policy = current.policy();
            let record = match target {
                RecordRef::Index(index) => current.get(index),
                RecordRef::Id(id) => current.get_by_id(id),
            };
            if policy == DeletePolicy::Soft && record.is_some_and(Record::is_deleted) {
                debug!(collection = %collection, target = ?target, "Record already removed");
                return Ok(snapshot.clone());
            }
            debug!(collection = %collection, target = ?target, policy = ?policy, "Removing record");
            let next = match target {
                RecordRef::Index(index) => reducer::remove_at(&current, index, policy)?,
                RecordRef::Id(id) => reducer::remove_by_id(&current, id, policy)?,
            };
            Ok(snapshot.with_collection(next))
        }
    }
}

/// Present collection, or an empty one for a declared-but-absent name.
fn resolve_collection<'a>(
    snapshot: &'a Snapshot,
    schema: &EditorSchema,
    name: &str,
) -> EditorResult<Cow<'a, Collection>> {
    let spec = schema
        .collection_spec(name)
        .ok_or_else(|| EditorError::UnknownCollection(name.to_string()))?;
    Ok(match snapshot.collection(name) {
        Some(collection) => Cow::Borrowed(collection),
        None => Cow::Owned(Collection::new(name, spec.policy)),
    })
}
