//! Core type definitions for the token configuration editor.
//!
//! This crate defines the small, shape-agnostic types every other crate in
//! the workspace depends on:
//! - [`RecordId`]: stable identity of a collection record (UUID v7)
//! - [`ErrorKey`]: structured address of a validation finding
//!
//! Field values themselves are plain `serde_json::Value`s and live in
//! `tokenconf-model`.

mod ids;
mod key;

pub use ids::RecordId;
pub use key::ErrorKey;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid record id: {0}")]
    InvalidRecordId(#[from] uuid::Error),
}
