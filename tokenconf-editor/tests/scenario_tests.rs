//! End-to-end editing sessions.

mod common;

use common::{editor_with_types, fields, token_editor};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokenconf_editor::Editor;
use tokenconf_model::{CollectionSpec, DeletePolicy, EditorSchema, ErrorKey, FieldRule};

// ── Token types ──────────────────────────────────────────────────

#[test]
fn add_then_name_a_token_type() {
    let mut editor = token_editor();
    editor.scope("tokenTypes").unwrap();

    let snapshot = editor
        .apply("newRecord", json!({"token_type_id": "1"}), Some(0))
        .unwrap();
    let types = snapshot.collection("tokenTypes").unwrap();
    assert_eq!(types.len(), 1);
    assert_eq!(types.get(0).unwrap().fields(), &fields(json!({"token_type_id": "1"})));

    let snapshot = editor.apply("name", json!("Sword"), Some(0)).unwrap();
    let record = snapshot.collection("tokenTypes").unwrap().get(0).unwrap();
    assert_eq!(record.get("name"), Some(&json!("Sword")));
    assert_eq!(record.get("token_type_id"), Some(&json!("1")));
}

// ── Royalty dependency ───────────────────────────────────────────

#[test]
fn royalty_percentage_required_when_enabled() {
    let mut editor = token_editor();
    editor.apply("has_royalty", json!(true), None).unwrap();
    editor.apply("royalty_percentage", json!(""), None).unwrap();

    let key = ErrorKey::root("royalty_percentage");
    assert!(!editor.validate().issues_for(&key).is_empty());

    editor.apply("royalty_percentage", json!("2.5"), None).unwrap();
    assert!(editor.validate().issues_for(&key).is_empty());
    assert!(editor.assemble().is_ok());
}

// ── Soft delete and cardinality ──────────────────────────────────

#[test]
fn soft_delete_respects_minimum() {
    let mut editor = token_editor();
    editor.scope("partitions").unwrap();
    editor.apply("newRecord", json!({"label": "Class B"}), Some(1)).unwrap();
    editor.apply("removeRecord", json!(null), Some(1)).unwrap();

    let partitions = ErrorKey::collection("partitions");
    assert!(editor.validate().issues_for(&partitions).is_empty());

    editor.apply("removeRecord", json!(null), Some(0)).unwrap();
    assert_eq!(
        editor.validate().issues_for(&partitions),
        ["at least one active record is required".to_string()]
    );

    let snapshot = editor.snapshot();
    let collection = snapshot.collection("partitions").unwrap();
    assert_eq!(collection.len(), 2);
    assert_eq!(collection.active_count(), 0);
}

// ── Hard delete and stale keys ───────────────────────────────────

#[test]
fn hard_delete_shifts_positions_and_invalidates_keys() {
    let mut editor = editor_with_types(3);
    editor.apply("name", json!(""), Some(2)).unwrap();
    let moved = editor.record_id_at("tokenTypes", 2).unwrap();

    let legacy = editor.validate().legacy_issues(Some("tokenTypes"));
    assert!(legacy.contains_key("2.name"));

    editor.apply("removeRecord", json!(null), Some(1)).unwrap();
    assert!(editor.last_report().is_none());
    assert_eq!(editor.record_id_at("tokenTypes", 1), Some(moved));
    assert_eq!(editor.record_id_at("tokenTypes", 2), None);

    let report = editor.validate();
    let legacy = report.legacy_issues(Some("tokenTypes"));
    assert!(!legacy.contains_key("2.name"));
    assert!(legacy.contains_key("1.name"));
    assert_eq!(
        report.issues_for(&ErrorKey::record("tokenTypes", 1, moved, "name")),
        ["name is required".to_string()]
    );
}

// ── Full session ─────────────────────────────────────────────────

const FILING_SCHEMA: &str = r#"
strip_fields = ["requiresProject"]

[root]
json_fields = ["metadata"]

[[root.rules]]
field = "name"
check = "required"

[collections.filings]
policy = "soft"
min_active = 1
defaults = { status = "draft" }

[[collections.filings.rules]]
field = "status"
check = "one_of"
values = ["draft", "submitted"]
"#;

#[test]
fn session_from_toml_schema() {
    let schema = EditorSchema::from_toml_str(FILING_SCHEMA).unwrap();
    let mut editor = Editor::new(schema).unwrap();
    assert!(editor.assemble().is_err());

    editor.apply("name", json!("Harbor Notes"), None).unwrap();
    editor.apply_text("metadata", r#"{"requiresProject": true, "tier": 2}"#, None).unwrap();
    editor.scope("filings").unwrap();
    editor.apply("newRecord", json!(null), Some(0)).unwrap();
    editor.apply("newRecord", json!({"status": "archived"}), Some(1)).unwrap();

    let id = editor.record_id_at("filings", 1).unwrap();
    assert_eq!(
        editor.validate().issues_for(&ErrorKey::record("filings", 1, id, "status")),
        ["status must be one of: draft, submitted".to_string()]
    );

    editor.apply("removeRecord", json!(null), Some(1)).unwrap();
    let out = editor.assemble().unwrap();
    assert_eq!(
        out.into_value(),
        json!({
            "name": "Harbor Notes",
            "metadata": {"tier": 2},
            "filings": [{"status": "draft"}]
        })
    );
    assert!(editor.is_modified());
}

#[test]
fn builder_and_toml_schemas_agree() {
    let built = EditorSchema::new()
        .root_json_field("metadata")
        .root_rule(FieldRule::required("name"))
        .collection(
            "filings",
            CollectionSpec::new(DeletePolicy::Soft)
                .min_active(1)
                .default_value("status", json!("draft"))
                .rule(FieldRule::one_of("status", vec![json!("draft"), json!("submitted")])),
        )
        .strip_field("requiresProject");
    assert_eq!(EditorSchema::from_toml_str(FILING_SCHEMA).unwrap(), built);
}
