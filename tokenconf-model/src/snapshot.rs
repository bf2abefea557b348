use crate::{Collection, Fields};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Immutable point-in-time view of the root record and every present collection.
///
/// A collection missing from the snapshot is *absent*; one present with zero
/// records is *empty*. The two assemble differently. Collections sit behind
/// `Arc` so a snapshot derived from another shares every collection it did
/// not touch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    revision: u64,
    root: Fields,
    collections: BTreeMap<String, Arc<Collection>>,
}

impl Snapshot {
    #[must_use]
    pub fn new(root: Fields, collections: impl IntoIterator<Item = Collection>) -> Self {
        Self {
            revision: 0,
            root,
            collections: collections
                .into_iter()
                .map(|c| (c.name().to_string(), Arc::new(c)))
                .collect(),
        }
    }

    /// Number of mutations applied since the session began.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn root(&self) -> &Fields {
        &self.root
    }

    pub fn root_field(&self, field: &str) -> Option<&Value> {
        self.root.get(field)
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name).map(Arc::as_ref)
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Present collections in name order.
    pub fn collections(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values().map(Arc::as_ref)
    }

    /// Successor with the root replaced and the revision bumped.
    #[must_use]
    pub fn with_root(&self, root: Fields) -> Self {
        Self {
            revision: self.revision + 1,
            root,
            collections: self.collections.clone(),
        }
    }

    /// Successor with one collection inserted or replaced and the revision bumped.
    #[must_use]
    pub fn with_collection(&self, collection: Collection) -> Self {
        let mut collections = self.collections.clone();
        collections.insert(collection.name().to_string(), Arc::new(collection));
        Self {
            revision: self.revision + 1,
            root: self.root.clone(),
            collections,
        }
    }

    /// True when both snapshots hold the same `Arc` for `name`.
    pub fn shares_collection(&self, other: &Snapshot, name: &str) -> bool {
        match (self.collections.get(name), other.collections.get(name)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let collections: BTreeMap<&str, &Collection> = self
            .collections
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_ref()))
            .collect();
        let mut state = serializer.serialize_struct("Snapshot", 3)?;
        state.serialize_field("revision", &self.revision)?;
        state.serialize_field("root", &self.root)?;
        state.serialize_field("collections", &collections)?;
        state.end()
    }
}
