//! Record-indexed field mutation for token configurations.
//!
//! Many independently rendered forms edit one configuration through a single
//! contract:
//!
//! - [`Editor::apply`]: takes `(field, value, index?)`; no index writes the
//!   root, an index writes a record of the collection in scope, and the
//!   pseudo-fields `newRecord` / `removeRecord` append and remove
//! - [`reducer`]: pure append / remove / update over one collection
//! - [`coerce`]: text surface for structured values, keeping raw text on
//!   parse failure
//! - [`ValidationEngine`]: issues and warnings keyed by [`ErrorKey`]
//! - [`ConfigAssembler`]: the normalized, submission-ready shape
//! - [`Draft`]: staged edits committed in one step
//!
//! ```
//! use serde_json::json;
//! use tokenconf_editor::Editor;
//! use tokenconf_model::{CollectionSpec, DeletePolicy, EditorSchema};
//!
//! let schema = EditorSchema::new()
//!     .collection("tokenTypes", CollectionSpec::new(DeletePolicy::Hard));
//! let mut editor = Editor::new(schema).unwrap();
//!
//! editor.scope("tokenTypes").unwrap();
//! editor.apply("newRecord", json!({"token_type_id": "1"}), Some(0)).unwrap();
//! let snapshot = editor.apply("name", json!("Sword"), Some(0)).unwrap();
//!
//! let record = &snapshot.collection("tokenTypes").unwrap().records()[0];
//! assert_eq!(record.get_str("name"), Some("Sword"));
//! ```

mod assemble;
pub mod coerce;
mod dispatch;
mod draft;
mod editor;
mod error;
pub mod reducer;
mod validate;

pub use assemble::{ConfigAssembler, NormalizedSnapshot};
pub use coerce::Coerced;
pub use dispatch::{Mutation, RecordRef, dispatch};
pub use draft::Draft;
pub use editor::Editor;
pub use error::{AssemblyError, EditorError, EditorResult};
pub use validate::{ValidationEngine, ValidationReport};

pub use tokenconf_model::ErrorKey;
