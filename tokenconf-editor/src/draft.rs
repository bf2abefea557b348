//! Staged edits.
//!
//! A [`Draft`] is a private copy of the root or of one record. Edits made to
//! it are invisible to every other reader until [`Draft::commit`] applies
//! them, all at once, through the editor.

use crate::coerce;
use crate::dispatch::{Mutation, RecordRef};
use crate::editor::Editor;
use crate::error::EditorResult;
use serde_json::Value;
use std::sync::Arc;
use tokenconf_model::{Fields, RecordId, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
enum DraftTarget {
    Root,
    Record { collection: String, id: RecordId },
}

/// Staged copy of the root record or of one collection record.
///
/// Record drafts remember the record's id, not its position, so a commit
/// lands on the right record even after siblings were removed.
#[derive(Debug, Clone)]
pub struct Draft {
    target: DraftTarget,
    base: Fields,
    staged: Fields,
}

impl Draft {
    pub(crate) fn root(base: Fields) -> Self {
        Self {
            target: DraftTarget::Root,
            staged: base.clone(),
            base,
        }
    }

    pub(crate) fn record(collection: &str, id: RecordId, base: Fields) -> Self {
        Self {
            target: DraftTarget::Record {
                collection: collection.to_string(),
                id,
            },
            staged: base.clone(),
            base,
        }
    }

    /// `None` for a root draft.
    pub fn collection(&self) -> Option<&str> {
        match &self.target {
            DraftTarget::Root => None,
            DraftTarget::Record { collection, .. } => Some(collection),
        }
    }

    /// `None` for a root draft.
    pub fn record_id(&self) -> Option<RecordId> {
        match &self.target {
            DraftTarget::Root => None,
            DraftTarget::Record { id, .. } => Some(*id),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.staged.get(field)
    }

    pub fn fields(&self) -> &Fields {
        &self.staged
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.staged.insert(field.into(), value);
    }

    /// Stages text through the JSON coercion layer.
    pub fn set_text(&mut self, field: impl Into<String>, text: &str) {
        self.set(field, coerce::from_text(text).into_value());
    }

    /// Current staged value rendered for a text input.
    pub fn text(&self, field: &str) -> String {
        coerce::to_text(self.staged.get(field))
    }

    /// Fields whose staged value differs from the committed one.
    pub fn changes(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.staged
            .iter()
            .filter(|(k, v)| self.base.get(k.as_str()) != Some(*v))
    }

    pub fn is_dirty(&self) -> bool {
        self.changes().next().is_some()
    }

    /// Drops staged edits.
    pub fn reset(&mut self) {
        self.staged = self.base.clone();
    }

    /// Applies every changed field as one new snapshot.
    ///
    /// A clean draft commits nothing and returns the current snapshot. On
    /// error the draft keeps its staged edits.
    pub fn commit(&mut self, editor: &mut Editor) -> EditorResult<Arc<Snapshot>> {
        if !self.is_dirty() {
            return Ok(editor.snapshot());
        }
        let mutations: Vec<Mutation> = self
            .changes()
            .map(|(field, value)| match &self.target {
                DraftTarget::Root => Mutation::SetRoot {
                    field: field.clone(),
                    value: value.clone(),
                },
                DraftTarget::Record { collection, id } => Mutation::SetField {
                    collection: collection.clone(),
                    target: RecordRef::Id(*id),
                    field: field.clone(),
                    value: value.clone(),
                },
            })
            .collect();

        let snapshot = editor.apply_batch(mutations)?;
        self.base = self.staged.clone();
        Ok(snapshot)
    }
}
