#![allow(dead_code)]

use serde_json::{Value, json};
use tokenconf_editor::Editor;
use tokenconf_model::{CollectionSpec, DeletePolicy, EditorSchema, Fields, FieldRule};

pub fn fields(value: Value) -> Fields {
    value.as_object().cloned().expect("fixture must be an object")
}

/// A token configuration with a hard-delete `tokenTypes` collection, a
/// soft-delete `partitions` collection and a royalty dependency on the root.
pub fn token_schema() -> EditorSchema {
    EditorSchema::new()
        .root_default("has_royalty", json!(false))
        .root_json_field("metadata")
        .root_rule(FieldRule::required("name"))
        .root_rule(FieldRule::required_if("royalty_percentage", "has_royalty"))
        .root_rule(FieldRule::percentage("royalty_percentage"))
        .collection(
            "tokenTypes",
            CollectionSpec::new(DeletePolicy::Hard)
                .json_field("properties")
                .rule(FieldRule::required("name")),
        )
        .collection(
            "partitions",
            CollectionSpec::new(DeletePolicy::Soft)
                .min_active(1)
                .rule(FieldRule::required("label").warning()),
        )
        .collection("filings", CollectionSpec::new(DeletePolicy::Hard))
        .strip_field("requiresProject")
}

/// Editor over [`token_schema`] with empty `tokenTypes` and one partition.
pub fn token_editor() -> Editor {
    Editor::with_initial(
        token_schema(),
        fields(json!({
            "name": "Relic",
            "tokenTypes": [],
            "partitions": [{"label": "Class A"}]
        })),
    )
    .expect("fixture schema is valid")
}

/// Scoped editor whose `tokenTypes` holds `n` records named t0..tN.
pub fn editor_with_types(n: usize) -> Editor {
    let mut editor = token_editor();
    editor.scope("tokenTypes").unwrap();
    for i in 0..n {
        editor
            .apply("newRecord", json!({"token_type_id": i.to_string(), "name": format!("t{i}")}), Some(i))
            .unwrap();
    }
    editor
}
