//! Named, ordered record collections.

use crate::Record;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use tokenconf_types::RecordId;

/// How a collection retires records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Splice the record out; every later position shifts down by one.
    #[default]
    Hard,
    /// Flag the record `_deleted` and keep its position.
    Soft,
}

/// An ordered sequence of records under one name.
///
/// Collections are values: the reducer in `tokenconf-editor` builds new ones
/// rather than mutating in place. Each collection keeps an `id -> position`
/// index so callers holding a [`RecordId`] can always find their record.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    name: String,
    policy: DeletePolicy,
    records: Vec<Record>,
    positions: HashMap<RecordId, usize>,
}

impl Collection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new(name: impl Into<String>, policy: DeletePolicy) -> Self {
        Self::from_records(name, policy, Vec::new())
    }

    #[must_use]
    pub fn from_records(name: impl Into<String>, policy: DeletePolicy, records: Vec<Record>) -> Self {
        let positions = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id(), i))
            .collect();
        Self {
            name: name.into(),
            policy,
            records,
            positions,
        }
    }

    /// Same name and policy, different records.
    #[must_use]
    pub fn with_records(&self, records: Vec<Record>) -> Self {
        Self::from_records(self.name.clone(), self.policy, records)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> DeletePolicy {
        self.policy
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Raw length, soft-deleted records included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn get_by_id(&self, id: RecordId) -> Option<&Record> {
        self.position_of(id).and_then(|i| self.records.get(i))
    }

    /// Current position of the record with this id.
    pub fn position_of(&self, id: RecordId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Records not soft-deleted, with their positions.
    pub fn active(&self) -> impl Iterator<Item = (usize, &Record)> {
        self.records.iter().enumerate().filter(|(_, r)| r.is_active())
    }

    /// Number of records not soft-deleted.
    pub fn active_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_active()).count()
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.records)
    }
}
