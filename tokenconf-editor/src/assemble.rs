//! Assembly of a validated snapshot into its submission shape.

use crate::coerce;
use crate::error::AssemblyError;
use crate::validate::{ValidationEngine, ValidationReport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokenconf_model::{EditorSchema, Fields, Snapshot, ValidationHook};
use tracing::{info, warn};

/// The submitted configuration: root fields plus one array per collection.
///
/// Soft-deleted records, record ids and the `_deleted` marker never appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedSnapshot(Fields);

impl NormalizedSnapshot {
    pub fn as_map(&self) -> &Fields {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Records of one collection; `None` when the collection was absent.
    pub fn collection(&self, name: &str) -> Option<&Vec<Value>> {
        self.0.get(name).and_then(Value::as_array)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }
}

/// Merges root and collections into a [`NormalizedSnapshot`].
pub struct ConfigAssembler<'a> {
    schema: &'a EditorSchema,
    hooks: &'a [Box<dyn ValidationHook>],
}

impl<'a> ConfigAssembler<'a> {
    pub fn new(schema: &'a EditorSchema, hooks: &'a [Box<dyn ValidationHook>]) -> Self {
        Self { schema, hooks }
    }

    /// Validates, then assembles. Fails without a partial result while any
    /// issue is outstanding.
    pub fn assemble(&self, snapshot: &Snapshot) -> Result<NormalizedSnapshot, AssemblyError> {
        let report = ValidationEngine::new(self.schema, self.hooks).validate(snapshot);
        self.assemble_checked(snapshot, &report)
    }

    /// Assembles using a report already computed for `snapshot`.
    pub fn assemble_checked(
        &self,
        snapshot: &Snapshot,
        report: &ValidationReport,
    ) -> Result<NormalizedSnapshot, AssemblyError> {
        if report.has_issues() {
            let count = report.issue_count();
            warn!(issues = count, revision = snapshot.revision(), "Assembly blocked by validation issues");
            return Err(AssemblyError::UnresolvedIssues {
                count,
                issues: report.issues().clone(),
            });
        }

        let mut out = flatten_fields(snapshot.root(), &self.schema.root.json_fields);

        for collection in snapshot.collections() {
            let json_fields = self
                .schema
                .collection_spec(collection.name())
                .map(|spec| spec.json_fields.as_slice())
                .unwrap_or_default();
            let records: Vec<Value> = collection
                .active()
                .map(|(_, record)| Value::Object(flatten_fields(record.fields(), json_fields)))
                .collect();
            if out.contains_key(collection.name()) {
                warn!(collection = %collection.name(), "Collection replaces root field of the same name");
            }
            out.insert(collection.name().to_string(), Value::Array(records));
        }

        if !self.schema.strip_fields.is_empty() {
            for value in out.values_mut() {
                strip_keys(value, &self.schema.strip_fields);
            }
            out.retain(|k, _| !self.schema.strip_fields.contains(k));
        }

        info!(
            revision = snapshot.revision(),
            warnings = report.warning_count(),
            "Assembled configuration"
        );
        Ok(NormalizedSnapshot(out))
    }
}

fn flatten_fields(fields: &Fields, json_fields: &[String]) -> Fields {
    fields
        .iter()
        .map(|(k, v)| {
            let v = if json_fields.contains(k) { coerce::flatten(v) } else { v.clone() };
            (k.clone(), v)
        })
        .collect()
}

/// Removes `keys` from every object nested anywhere in `value`.
fn strip_keys(value: &mut Value, keys: &[String]) {
    match value {
        Value::Object(map) => {
            map.retain(|k, _| !keys.contains(k));
            for child in map.values_mut() {
                strip_keys(child, keys);
            }
        }
        Value::Array(items) => {
            for item in items {
                strip_keys(item, keys);
            }
        }
        _ => {}
    }
}
