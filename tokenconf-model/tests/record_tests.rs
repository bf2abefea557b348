use pretty_assertions::assert_eq;
use serde_json::json;
use tokenconf_model::{Fields, Record, RecordError};

fn fields(value: serde_json::Value) -> Fields {
    value.as_object().cloned().unwrap()
}

// ── Construction ─────────────────────────────────────────────────

#[test]
fn new_record_is_active_with_fresh_id() {
    let a = Record::new(Fields::new());
    let b = Record::new(Fields::new());
    assert!(a.is_active());
    assert!(!a.is_deleted());
    assert_ne!(a.id(), b.id());
}

#[test]
fn from_json_reads_deleted_marker() {
    let record = Record::from_json(json!({"name": "Shield", "_deleted": true})).unwrap();
    assert!(record.is_deleted());
    assert_eq!(record.get("_deleted"), None);
    assert_eq!(record.get_str("name"), Some("Shield"));
}

#[test]
fn from_json_rejects_non_objects() {
    assert_eq!(Record::from_json(json!([1, 2])), Err(RecordError::NotAnObject("array")));
    assert_eq!(Record::from_json(json!("text")), Err(RecordError::NotAnObject("string")));
    assert_eq!(Record::from_json(json!(null)), Err(RecordError::NotAnObject("null")));
}

#[test]
fn from_json_rejects_non_boolean_deleted_marker() {
    assert_eq!(
        Record::from_json(json!({"name": "Shield", "_deleted": "true"})),
        Err(RecordError::InvalidDeletedMarker("string"))
    );
    assert_eq!(
        Record::from_json(json!({"_deleted": 1})),
        Err(RecordError::InvalidDeletedMarker("number"))
    );
    assert!(Record::from_json(json!({"_deleted": null})).unwrap().is_active());
}

#[test]
fn from_json_restores_serialized_id() {
    let original = Record::new(fields(json!({"name": "Shield"})));
    let restored = Record::from_json(serde_json::to_value(&original).unwrap()).unwrap();
    assert_eq!(restored, original);
    assert_eq!(restored.get("_id"), None);
}

#[test]
fn from_json_rejects_bad_ids() {
    assert_eq!(
        Record::from_json(json!({"_id": "nope"})),
        Err(RecordError::InvalidId("nope".into()))
    );
    assert_eq!(
        Record::from_json(json!({"_id": 7})),
        Err(RecordError::InvalidId("7".into()))
    );
}

// ── Accessors ────────────────────────────────────────────────────

#[test]
fn typed_accessors() {
    let record = Record::new(fields(json!({
        "name": "Sword",
        "fungible": false,
        "supply": 100,
        "metadata": {"image": {"url": "ipfs://x"}}
    })));
    assert_eq!(record.get_str("name"), Some("Sword"));
    assert_eq!(record.get_bool("fungible"), Some(false));
    assert_eq!(record.get_number("supply"), Some(100.0));
    assert_eq!(record.get_str("supply"), None);
    assert_eq!(record.pointer("/metadata/image/url"), Some(&json!("ipfs://x")));
    assert_eq!(record.pointer("/name"), Some(&json!("Sword")));
    assert_eq!(record.pointer("name"), None);
    assert_eq!(record.pointer("/missing/x"), None);
}

// ── Mutation ─────────────────────────────────────────────────────

#[test]
fn with_field_keeps_id_and_other_fields() {
    let record = Record::new(fields(json!({"token_type_id": "1", "name": ""})));
    let next = record.with_field("name", json!("Sword"));
    assert_eq!(next.id(), record.id());
    assert_eq!(next.get_str("name"), Some("Sword"));
    assert_eq!(next.get("token_type_id"), record.get("token_type_id"));
    assert_eq!(record.get_str("name"), Some(""));
}

#[test]
fn set_field_returns_previous_value() {
    let mut record = Record::new(fields(json!({"a": 1})));
    assert_eq!(record.set_field("a", json!(2)), Some(json!(1)));
    assert_eq!(record.set_field("b", json!(3)), None);
}

#[test]
fn mark_deleted_is_sticky() {
    let mut record = Record::new(Fields::new());
    record.mark_deleted();
    record.mark_deleted();
    assert!(record.is_deleted());
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn serializes_flat_with_id_and_marker() {
    let mut record = Record::new(fields(json!({"name": "Sword"})));
    let active = serde_json::to_value(&record).unwrap();
    assert_eq!(active["name"], json!("Sword"));
    assert_eq!(active["_id"], json!(record.id().to_string()));
    assert!(active.get("_deleted").is_none());

    record.mark_deleted();
    let deleted = serde_json::to_value(&record).unwrap();
    assert_eq!(deleted["_deleted"], json!(true));

    let back: Record = serde_json::from_value(deleted).unwrap();
    assert_eq!(back, record);
}
