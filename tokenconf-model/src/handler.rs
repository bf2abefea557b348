use crate::{Fields, Record, Severity, Snapshot};
use tokenconf_types::ErrorKey;

/// A single validation finding produced by a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub key: ErrorKey,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn issue(key: ErrorKey, message: impl Into<String>) -> Self {
        Self {
            key,
            severity: Severity::Issue,
            message: message.into(),
        }
    }

    pub fn warning(key: ErrorKey, message: impl Into<String>) -> Self {
        Self {
            key,
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// Optional trait for domain checks the generic rules cannot express
/// (per-standard royalty caps, vesting arithmetic, ...).
///
/// Declared rules and `min_active` run first; hook findings are added after.
///
/// Hooks must be deterministic: the same snapshot must produce the same
/// findings. Soft-deleted records are never passed to `check_record`.
pub trait ValidationHook: Send + Sync {
    /// Inspect the root record.
    fn check_root(&self, root: &Fields) -> Vec<Finding> {
        let _ = root;
        Vec::new()
    }

    /// Inspect one active record.
    fn check_record(&self, collection: &str, index: usize, record: &Record) -> Vec<Finding> {
        let _ = (collection, index, record);
        Vec::new()
    }

    /// Inspect the whole snapshot (cross-collection checks).
    fn check_snapshot(&self, snapshot: &Snapshot) -> Vec<Finding> {
        let _ = snapshot;
        Vec::new()
    }
}
