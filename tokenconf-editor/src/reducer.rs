//! Pure operations over one named collection.
//!
//! Every function takes the current collection by reference and returns a
//! new one. On an out-of-range position the caller keeps its original
//! collection and gets an error back; nothing is partially applied.

use crate::error::{EditorError, EditorResult};
use serde_json::Value;
use tokenconf_model::{Collection, DeletePolicy, Fields, Record, RecordId};

/// Appends one record at the tail. Prior positions are unchanged.
pub fn append(collection: &Collection, defaults: Fields) -> Collection {
    let mut records = collection.records().to_vec();
    records.push(Record::new(defaults));
    collection.with_records(records)
}

/// Removes the record at `index`: spliced out under [`DeletePolicy::Hard`],
/// flagged `_deleted` under [`DeletePolicy::Soft`].
pub fn remove_at(collection: &Collection, index: usize, policy: DeletePolicy) -> EditorResult<Collection> {
    check_index(collection, index)?;
    let mut records = collection.records().to_vec();
    match policy {
        DeletePolicy::Hard => {
            records.remove(index);
        }
        DeletePolicy::Soft => records[index].mark_deleted(),
    }
    Ok(collection.with_records(records))
}

/// Replaces one field of the record at `index`.
pub fn update_at(collection: &Collection, index: usize, field: &str, value: Value) -> EditorResult<Collection> {
    check_index(collection, index)?;
    let mut records = collection.records().to_vec();
    records[index].set_field(field, value);
    Ok(collection.with_records(records))
}

/// [`remove_at`] addressed by stable id.
pub fn remove_by_id(collection: &Collection, id: RecordId, policy: DeletePolicy) -> EditorResult<Collection> {
    remove_at(collection, resolve(collection, id)?, policy)
}

/// [`update_at`] addressed by stable id.
pub fn update_by_id(collection: &Collection, id: RecordId, field: &str, value: Value) -> EditorResult<Collection> {
    update_at(collection, resolve(collection, id)?, field, value)
}

fn check_index(collection: &Collection, index: usize) -> EditorResult<()> {
    if index < collection.len() {
        Ok(())
    } else {
        Err(EditorError::IndexOutOfRange {
            collection: collection.name().to_string(),
            index,
            len: collection.len(),
        })
    }
}

fn resolve(collection: &Collection, id: RecordId) -> EditorResult<usize> {
    collection
        .position_of(id)
        .ok_or_else(|| EditorError::UnknownRecord {
            collection: collection.name().to_string(),
            id,
        })
}
