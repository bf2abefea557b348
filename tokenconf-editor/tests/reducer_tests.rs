//! Pure collection operations.

mod common;

use common::fields;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use tokenconf_editor::EditorError;
use tokenconf_editor::reducer::{append, remove_at, remove_by_id, update_at, update_by_id};
use tokenconf_model::{Collection, DeletePolicy, Fields};

fn collection_of(names: &[&str], policy: DeletePolicy) -> Collection {
    names.iter().fold(Collection::new("recipes", policy), |c, name| {
        append(&c, fields(json!({"name": name, "ratio": 1})))
    })
}

// ── append ───────────────────────────────────────────────────────

#[test]
fn append_adds_at_tail() {
    let c = collection_of(&["a", "b"], DeletePolicy::Hard);
    let next = append(&c, fields(json!({"name": "c"})));

    assert_eq!(next.len(), 3);
    assert_eq!(next.records()[..2], c.records()[..]);
    assert_eq!(next.records()[2].get_str("name"), Some("c"));
    assert_eq!(c.len(), 2);
}

#[test]
fn append_to_empty() {
    let c = Collection::new("tokenTypes", DeletePolicy::Hard);
    let next = append(&c, fields(json!({"token_type_id": "1"})));
    assert_eq!(next.records()[0].fields(), &fields(json!({"token_type_id": "1"})));
}

// ── remove_at ────────────────────────────────────────────────────

#[test]
fn hard_remove_splices() {
    let c = collection_of(&["a", "b", "c"], DeletePolicy::Hard);
    let c_id = c.records()[2].id();
    let next = remove_at(&c, 1, DeletePolicy::Hard).unwrap();

    let names: Vec<_> = next.records().iter().filter_map(|r| r.get_str("name")).collect();
    assert_eq!(names, vec!["a", "c"]);
    assert_eq!(next.position_of(c_id), Some(1));
}

#[test]
fn soft_remove_flags_in_place() {
    let c = collection_of(&["a", "b"], DeletePolicy::Soft);
    let next = remove_at(&c, 0, DeletePolicy::Soft).unwrap();

    assert_eq!(next.len(), 2);
    assert!(next.records()[0].is_deleted());
    assert_eq!(next.records()[0].get_str("name"), Some("a"));
    assert_eq!(next.active_count(), 1);
}

#[test]
fn soft_remove_twice_is_noop() {
    let c = collection_of(&["a"], DeletePolicy::Soft);
    let once = remove_at(&c, 0, DeletePolicy::Soft).unwrap();
    let twice = remove_at(&once, 0, DeletePolicy::Soft).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn remove_out_of_range_is_error() {
    let c = collection_of(&["a"], DeletePolicy::Hard);
    let err = remove_at(&c, 1, DeletePolicy::Hard).unwrap_err();
    assert_eq!(
        err,
        EditorError::IndexOutOfRange {
            collection: "recipes".into(),
            index: 1,
            len: 1
        }
    );
}

// ── update_at ────────────────────────────────────────────────────

#[test]
fn update_touches_one_field_of_one_record() {
    let c = collection_of(&["a", "b"], DeletePolicy::Hard);
    let next = update_at(&c, 1, "name", json!("B")).unwrap();

    assert_eq!(next.records()[0], c.records()[0]);
    assert_eq!(next.records()[1].id(), c.records()[1].id());
    assert_eq!(next.records()[1].get_str("name"), Some("B"));
    assert_eq!(next.records()[1].get("ratio"), Some(&json!(1)));
}

#[test]
fn update_on_soft_deleted_record_is_allowed() {
    let c = collection_of(&["a"], DeletePolicy::Soft);
    let removed = remove_at(&c, 0, DeletePolicy::Soft).unwrap();
    let next = update_at(&removed, 0, "name", json!("z")).unwrap();
    assert!(next.records()[0].is_deleted());
    assert_eq!(next.records()[0].get_str("name"), Some("z"));
}

#[test]
fn update_out_of_range_is_error() {
    let c = Collection::new("recipes", DeletePolicy::Hard);
    assert!(matches!(
        update_at(&c, 0, "name", json!("x")),
        Err(EditorError::IndexOutOfRange { len: 0, .. })
    ));
}

// ── id addressing ────────────────────────────────────────────────

#[test]
fn id_addressing_follows_record_across_splices() {
    let c = collection_of(&["a", "b", "c"], DeletePolicy::Hard);
    let c_id = c.records()[2].id();

    let shifted = remove_at(&c, 0, DeletePolicy::Hard).unwrap();
    let updated = update_by_id(&shifted, c_id, "name", json!("C")).unwrap();
    assert_eq!(updated.records()[1].get_str("name"), Some("C"));

    let removed = remove_by_id(&updated, c_id, DeletePolicy::Hard).unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed.position_of(c_id), None);
}

#[test]
fn stale_id_is_unknown_record() {
    let c = collection_of(&["a"], DeletePolicy::Hard);
    let id = c.records()[0].id();
    let empty = remove_at(&c, 0, DeletePolicy::Hard).unwrap();
    assert!(matches!(
        update_by_id(&empty, id, "name", json!("x")),
        Err(EditorError::UnknownRecord { .. })
    ));
}

// ── Laws ─────────────────────────────────────────────────────────

fn names_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,6}", 0..8)
}

proptest! {
    #[test]
    fn append_then_hard_remove_tail_is_identity(names in names_strategy(), extra in "[a-z]{1,6}") {
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let before = collection_of(&refs, DeletePolicy::Hard);

        let grown = append(&before, fields(json!({"name": extra})));
        let back = remove_at(&grown, grown.len() - 1, DeletePolicy::Hard).unwrap();
        prop_assert_eq!(back, before);
    }

    #[test]
    fn update_changes_exactly_one_field(names in names_strategy(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!names.is_empty());
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let before = collection_of(&refs, DeletePolicy::Hard);
        let index = pick.index(before.len());

        let after = update_at(&before, index, "name", json!("changed")).unwrap();
        for (i, (old, new)) in before.records().iter().zip(after.records()).enumerate() {
            if i == index {
                let mut expected: Fields = old.fields().clone();
                expected.insert("name".into(), json!("changed"));
                prop_assert_eq!(new.fields(), &expected);
                prop_assert_eq!(new.id(), old.id());
            } else {
                prop_assert_eq!(new, old);
            }
        }
    }
}
