use crate::error::RecordError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokenconf_types::RecordId;

/// Field name to value mapping shared by the root record and collection records.
pub type Fields = serde_json::Map<String, Value>;

/// Soft-delete marker key as it appears in initial values and raw snapshots.
pub const DELETED_MARKER: &str = "_deleted";

/// Key the record id is written under in serialized snapshots.
pub const ID_MARKER: &str = "_id";

/// JSON type name used in error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// One member of a named collection.
///
/// The record's position in its collection is implicit; `id` is assigned at
/// creation and never changes, so it keeps pointing at the same record when
/// siblings are spliced out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id")]
    id: RecordId,
    #[serde(rename = "_deleted", default, skip_serializing_if = "is_false")]
    deleted: bool,
    #[serde(flatten)]
    fields: Fields,
}

impl Record {
    /// Creates an active record with a fresh id.
    pub fn new(fields: Fields) -> Self {
        Self::with_id(RecordId::new(), fields)
    }

    pub fn with_id(id: RecordId, fields: Fields) -> Self {
        Self {
            id,
            deleted: false,
            fields,
        }
    }

    /// Builds a record from a JSON object as found in initial values or a
    /// serialized snapshot.
    ///
    /// `_id` restores the record's id and `_deleted` its soft-delete flag;
    /// neither stays in the field map. A missing or `null` marker means a
    /// fresh id and an active record.
    pub fn from_json(value: Value) -> Result<Self, RecordError> {
        let Value::Object(mut fields) = value else {
            return Err(RecordError::NotAnObject(json_kind(&value)));
        };
        let deleted = match fields.remove(DELETED_MARKER) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => b,
            Some(other) => return Err(RecordError::InvalidDeletedMarker(json_kind(&other))),
        };
        let id = match fields.remove(ID_MARKER) {
            None | Some(Value::Null) => RecordId::new(),
            Some(Value::String(s)) => RecordId::parse(&s).map_err(|_| RecordError::InvalidId(s))?,
            Some(other) => return Err(RecordError::InvalidId(other.to_string())),
        };
        let mut record = Self::with_id(id, fields);
        record.deleted = deleted;
        Ok(record)
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Extract a string value by field name.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(|v| v.as_str())
    }

    /// Extract a boolean value by field name.
    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(|v| v.as_bool())
    }

    /// Extract a numeric value by field name.
    pub fn get_number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(|v| v.as_f64())
    }

    /// Extract a nested value using a JSON pointer (e.g., "/metadata/image").
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let (head, rest) = match pointer.strip_prefix('/') {
            Some(p) => p.split_once('/').map_or((p, ""), |(h, r)| (h, r)),
            None => return None,
        };
        let value = self.fields.get(&head.replace("~1", "/").replace("~0", "~"))?;
        if rest.is_empty() {
            Some(value)
        } else {
            value.pointer(&format!("/{rest}"))
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    /// Sets one field, returning the previous value.
    pub fn set_field(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(field.into(), value)
    }

    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    /// Copy of this record with one field replaced and the same id.
    #[must_use]
    pub fn with_field(&self, field: impl Into<String>, value: Value) -> Self {
        let mut next = self.clone();
        next.set_field(field, value);
        next
    }
}
