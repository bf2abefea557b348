//! The editing session.
//!
//! [`Editor`] owns the schema, the current snapshot, the collection in scope
//! for index-addressed calls, and the latest validation report. Every
//! successful mutation replaces the snapshot `Arc`; nothing is ever mutated
//! in place, so a reader holding the previous `Arc` keeps a consistent view.

use crate::assemble::{ConfigAssembler, NormalizedSnapshot};
use crate::coerce;
use crate::dispatch::{Mutation, dispatch};
use crate::draft::Draft;
use crate::error::{AssemblyError, EditorError, EditorResult};
use crate::validate::{ValidationEngine, ValidationReport};
use serde_json::Value;
use std::sync::Arc;
use std::collections::HashSet;
use tokenconf_model::{
    Collection, EditorSchema, Fields, Record, RecordError, RecordId, Snapshot, ValidationHook, json_kind,
};
use tracing::{debug, warn};

/// One editing session over a token configuration.
///
/// Forms call [`Editor::apply`] (or the typed [`Editor::apply_mutation`]);
/// each accepted edit publishes a new [`Snapshot`], readable through
/// [`Editor::snapshot`]. Validation and assembly run on demand.
pub struct Editor {
    schema: EditorSchema,
    hooks: Vec<Box<dyn ValidationHook>>,
    initial: Arc<Snapshot>,
    current: Arc<Snapshot>,
    scope: Option<String>,
    report: Option<ValidationReport>,
}

impl Editor {
    /// Starts a session from schema defaults alone.
    pub fn new(schema: EditorSchema) -> EditorResult<Self> {
        Self::with_initial(schema, Fields::new())
    }

    /// Starts a session from schema defaults merged with `initial`.
    ///
    /// Keys naming a declared collection must hold an array of objects (or
    /// `null`, meaning absent); every other key becomes a root field and
    /// overrides the schema default. Records carrying `_id` keep that id, so
    /// a serialized snapshot reloads with its identities intact.
    pub fn with_initial(schema: EditorSchema, initial: Fields) -> EditorResult<Self> {
        schema
            .check()
            .map_err(|e| EditorError::InvalidSchema(e.to_string()))?;

        let mut root = schema.root.defaults.clone();
        let mut collections = Vec::new();
        for (key, value) in initial {
            let Some(spec) = schema.collection_spec(&key) else {
                root.insert(key, value);
                continue;
            };
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    let records = items
                        .into_iter()
                        .map(|item| {
                            Record::from_json(item).map_err(|source| match source {
                                RecordError::NotAnObject(kind) => EditorError::InvalidRecord(kind),
                                source => EditorError::MalformedRecord {
                                    collection: key.clone(),
                                    source,
                                },
                            })
                        })
                        .collect::<EditorResult<Vec<_>>>()?;
                    let mut seen = HashSet::new();
                    if let Some(dup) = records.iter().map(Record::id).find(|id| !seen.insert(*id)) {
                        return Err(EditorError::DuplicateRecordId { collection: key, id: dup });
                    }
                    collections.push(Collection::from_records(key, spec.policy, records));
                }
                other => return Err(EditorError::InvalidRecord(json_kind(&other))),
            }
        }

        let snapshot = Arc::new(Snapshot::new(root, collections));
        debug!(
            root_fields = snapshot.root().len(),
            collections = snapshot.collections().count(),
            "Editor session started"
        );
        Ok(Self {
            schema,
            hooks: Vec::new(),
            initial: Arc::clone(&snapshot),
            current: snapshot,
            scope: None,
            report: None,
        })
    }

    /// Registers a domain validation hook.
    pub fn add_hook(&mut self, hook: impl ValidationHook + 'static) {
        self.hooks.push(Box::new(hook));
        self.report = None;
    }

    #[must_use]
    pub fn with_hook(mut self, hook: impl ValidationHook + 'static) -> Self {
        self.add_hook(hook);
        self
    }

    pub fn schema(&self) -> &EditorSchema {
        &self.schema
    }

    /// Current read-only snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    /// True once any mutation has been applied.
    pub fn is_modified(&self) -> bool {
        !Arc::ptr_eq(&self.initial, &self.current)
    }

    /// Sets the collection index-addressed calls apply to.
    pub fn scope(&mut self, collection: &str) -> EditorResult<()> {
        if self.schema.collection_spec(collection).is_none() {
            warn!(collection = %collection, "Rejected scope to undeclared collection");
            return Err(EditorError::UnknownCollection(collection.to_string()));
        }
        self.scope = Some(collection.to_string());
        Ok(())
    }

    pub fn clear_scope(&mut self) {
        self.scope = None;
    }

    pub fn current_scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// The form-level entry point: `(field, value, index?)` against the
    /// collection in scope.
    pub fn apply(&mut self, field: &str, value: Value, index: Option<usize>) -> EditorResult<Arc<Snapshot>> {
        let mutation = Mutation::from_call(field, value, index, self.scope.as_deref())
            .inspect_err(|e| warn!(field = %field, error = %e, "Rejected mutation"))?;
        self.apply_mutation(mutation)
    }

    /// [`Self::apply`] against an explicit collection, ignoring the scope.
    pub fn apply_in(
        &mut self,
        collection: &str,
        field: &str,
        value: Value,
        index: usize,
    ) -> EditorResult<Arc<Snapshot>> {
        let mutation = Mutation::from_call(field, value, Some(index), Some(collection))?;
        self.apply_mutation(mutation)
    }

    /// [`Self::apply`] for a text-edited field. Unparseable text is stored
    /// verbatim.
    pub fn apply_text(&mut self, field: &str, text: &str, index: Option<usize>) -> EditorResult<Arc<Snapshot>> {
        self.apply(field, coerce::from_text(text).into_value(), index)
    }

    /// Current value of a field rendered for a text input.
    pub fn field_text(&self, field: &str, index: Option<usize>) -> EditorResult<String> {
        let Some(index) = index else {
            return Ok(coerce::to_text(self.current.root_field(field)));
        };
        let name = self
            .scope
            .as_deref()
            .ok_or_else(|| EditorError::NoActiveCollection(field.to_string()))?;
        let record = self.record_at(name, index)?;
        Ok(coerce::to_text(record.get(field)))
    }

    pub fn apply_mutation(&mut self, mutation: Mutation) -> EditorResult<Arc<Snapshot>> {
        self.apply_batch([mutation])
    }

    /// Applies mutations in order and publishes one snapshot. If any fails,
    /// none are published; if none changes anything, the current snapshot is
    /// returned as is.
    pub fn apply_batch(&mut self, mutations: impl IntoIterator<Item = Mutation>) -> EditorResult<Arc<Snapshot>> {
        let mut working: Option<Snapshot> = None;
        for mutation in mutations {
            let base = working.as_ref().unwrap_or(self.current.as_ref());
            let next = dispatch(base, &self.schema, mutation)
                .inspect_err(|e| warn!(error = %e, "Rejected mutation"))?;
            if next.revision() != base.revision() {
                working = Some(next);
            }
        }
        let Some(next) = working else {
            return Ok(self.snapshot());
        };
        self.current = Arc::new(next);
        self.report = None;
        debug!(revision = self.current.revision(), "Published snapshot");
        Ok(self.snapshot())
    }

    /// Recomputes validation for the current snapshot.
    pub fn validate(&mut self) -> &ValidationReport {
        let report = ValidationEngine::new(&self.schema, &self.hooks).validate(&self.current);
        self.report.insert(report)
    }

    /// Report from the last [`Self::validate`], if no mutation happened since.
    ///
    /// Keys embed positions, so a report is dropped on every mutation rather
    /// than reused against a snapshot whose positions may have shifted.
    pub fn last_report(&self) -> Option<&ValidationReport> {
        self.report.as_ref()
    }

    /// Validates and assembles the current snapshot for submission.
    pub fn assemble(&mut self) -> Result<NormalizedSnapshot, AssemblyError> {
        let report = ValidationEngine::new(&self.schema, &self.hooks).validate(&self.current);
        let result = ConfigAssembler::new(&self.schema, &self.hooks).assemble_checked(&self.current, &report);
        self.report = Some(report);
        result
    }

    /// Stages edits to the root record.
    pub fn draft_root(&self) -> Draft {
        Draft::root(self.current.root().clone())
    }

    /// Stages edits to the record with `id`.
    pub fn draft_record(&self, collection: &str, id: RecordId) -> EditorResult<Draft> {
        let record = self
            .present(collection)?
            .and_then(|c| c.get_by_id(id))
            .ok_or_else(|| EditorError::UnknownRecord {
                collection: collection.to_string(),
                id,
            })?;
        Ok(Draft::record(collection, id, record.fields().clone()))
    }

    /// Stages edits to the record currently at `index`. The draft follows the
    /// record, not the position.
    pub fn draft_at(&self, collection: &str, index: usize) -> EditorResult<Draft> {
        let record = self.record_at(collection, index)?;
        Ok(Draft::record(collection, record.id(), record.fields().clone()))
    }

    /// Stable id of the record currently at `index`.
    pub fn record_id_at(&self, collection: &str, index: usize) -> Option<RecordId> {
        self.current
            .collection(collection)
            .and_then(|c| c.get(index))
            .map(Record::id)
    }

    /// Current position of the record with `id`.
    pub fn position_of(&self, collection: &str, id: RecordId) -> Option<usize> {
        self.current
            .collection(collection)
            .and_then(|c| c.position_of(id))
    }

    /// Declared collection as present in the current snapshot (`None` when absent).
    fn present(&self, name: &str) -> EditorResult<Option<&Collection>> {
        if self.schema.collection_spec(name).is_none() {
            return Err(EditorError::UnknownCollection(name.to_string()));
        }
        Ok(self.current.collection(name))
    }

    fn record_at(&self, name: &str, index: usize) -> EditorResult<&Record> {
        let collection = self.present(name)?;
        collection
            .and_then(|c| c.get(index))
            .ok_or_else(|| EditorError::IndexOutOfRange {
                collection: name.to_string(),
                index,
                len: collection.map_or(0, Collection::len),
            })
    }
}
