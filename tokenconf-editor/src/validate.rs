//! Validation engine: derives issues and warnings from a snapshot.
//!
//! Findings are data, never errors. The same snapshot always produces the
//! same report: rules run in schema order, findings land in ordered maps,
//! and nothing reads the clock or the environment.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tokenconf_model::{
    Check, ErrorKey, EditorSchema, Fields, FieldRule, Finding, Severity, Snapshot, ValidationHook,
};

/// Issues (blocking) and warnings (advisory) keyed by where they apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: BTreeMap<ErrorKey, Vec<String>>,
    warnings: BTreeMap<ErrorKey, Vec<String>>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, severity: Severity, key: ErrorKey, message: impl Into<String>) {
        let map = match severity {
            Severity::Issue => &mut self.issues,
            Severity::Warning => &mut self.warnings,
        };
        map.entry(key).or_default().push(message.into());
    }

    pub fn push(&mut self, finding: Finding) {
        self.add(finding.severity, finding.key, finding.message);
    }

    /// True when nothing blocks submission. Warnings may remain.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn issues(&self) -> &BTreeMap<ErrorKey, Vec<String>> {
        &self.issues
    }

    pub fn warnings(&self) -> &BTreeMap<ErrorKey, Vec<String>> {
        &self.warnings
    }

    /// Total number of issue messages.
    pub fn issue_count(&self) -> usize {
        self.issues.values().map(Vec::len).sum()
    }

    /// Total number of warning messages.
    pub fn warning_count(&self) -> usize {
        self.warnings.values().map(Vec::len).sum()
    }

    pub fn issues_for(&self, key: &ErrorKey) -> &[String] {
        self.issues.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn warnings_for(&self, key: &ErrorKey) -> &[String] {
        self.warnings.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Issues for the root plus one collection, keyed the way index-based
    /// forms look them up: `"<index>.<field>"`, `"<field>"`, or the
    /// collection name for cardinality findings.
    pub fn legacy_issues(&self, collection: Option<&str>) -> BTreeMap<String, Vec<String>> {
        legacy_view(&self.issues, collection)
    }

    /// Warning counterpart of [`Self::legacy_issues`].
    pub fn legacy_warnings(&self, collection: Option<&str>) -> BTreeMap<String, Vec<String>> {
        legacy_view(&self.warnings, collection)
    }

    pub fn into_issues(self) -> BTreeMap<ErrorKey, Vec<String>> {
        self.issues
    }
}

impl Serialize for ValidationReport {
    /// Keys render with their `Display` form (`tokenTypes[0].name`).
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationReport", 2)?;
        state.serialize_field("issues", &display_keyed(&self.issues))?;
        state.serialize_field("warnings", &display_keyed(&self.warnings))?;
        state.end()
    }
}

fn display_keyed(map: &BTreeMap<ErrorKey, Vec<String>>) -> BTreeMap<String, &Vec<String>> {
    map.iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn legacy_view(
    map: &BTreeMap<ErrorKey, Vec<String>>,
    collection: Option<&str>,
) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, messages) in map {
        if key.collection_name().is_none() || key.collection_name() == collection {
            out.entry(key.legacy_key())
                .or_default()
                .extend(messages.iter().cloned());
        }
    }
    out
}

/// Runs the schema's rules and any registered hooks over a snapshot.
pub struct ValidationEngine<'a> {
    schema: &'a EditorSchema,
    hooks: &'a [Box<dyn ValidationHook>],
}

impl<'a> ValidationEngine<'a> {
    pub fn new(schema: &'a EditorSchema, hooks: &'a [Box<dyn ValidationHook>]) -> Self {
        Self { schema, hooks }
    }

    pub fn validate(&self, snapshot: &Snapshot) -> ValidationReport {
        let mut report = ValidationReport::new();

        let root_json = &self.schema.root.json_fields;
        check_fields(snapshot.root(), &self.schema.root.rules, root_json, &mut report, |field| {
            ErrorKey::root(field)
        });

        for (name, spec) in &self.schema.collections {
            let collection = snapshot.collection(name);
            if let Some(collection) = collection {
                for (index, record) in collection.active() {
                    let id = record.id();
                    check_fields(record.fields(), &spec.rules, &spec.json_fields, &mut report, |field| {
                        ErrorKey::record(name.as_str(), index, id, field)
                    });
                }
            }

            let active = collection.map_or(0, |c| c.active_count());
            if active < spec.min_active {
                let message = if spec.min_active == 1 {
                    "at least one active record is required".to_string()
                } else {
                    format!("at least {} active records are required", spec.min_active)
                };
                report.add(Severity::Issue, ErrorKey::collection(name.as_str()), message);
            }
        }

        for hook in self.hooks {
            for finding in hook.check_root(snapshot.root()) {
                report.push(finding);
            }
            for collection in snapshot.collections() {
                for (index, record) in collection.active() {
                    for finding in hook.check_record(collection.name(), index, record) {
                        report.push(finding);
                    }
                }
            }
            for finding in hook.check_snapshot(snapshot) {
                report.push(finding);
            }
        }

        report
    }
}

fn check_fields(
    fields: &Fields,
    rules: &[FieldRule],
    json_fields: &[String],
    report: &mut ValidationReport,
    key: impl Fn(&str) -> ErrorKey,
) {
    for rule in rules {
        if let Some(default_message) = check_rule(&rule.check, &rule.field, fields) {
            let message = rule.message.clone().unwrap_or(default_message);
            report.add(rule.severity, key(&rule.field), message);
        }
    }

    // Declared JSON-text fields get a format check unless a rule covers it.
    for field in json_fields {
        let covered = rules
            .iter()
            .any(|r| r.field == *field && r.check == Check::Json);
        if !covered {
            if let Some(message) = check_rule(&Check::Json, field, fields) {
                report.add(Severity::Issue, key(field), message);
            }
        }
    }
}

/// Default message when `check` fails for `field`, `None` when it passes.
fn check_rule(check: &Check, field: &str, fields: &Fields) -> Option<String> {
    let value = fields.get(field);
    match check {
        Check::Required => is_blank(value).then(|| format!("{field} is required")),
        Check::RequiredIf { flag } => (is_truthy(fields.get(flag.as_str())) && is_blank(value))
            .then(|| format!("{field} is required when {flag} is enabled")),
        Check::Range { min, max } => {
            if is_blank(value) {
                return None;
            }
            let Some(n) = value.and_then(as_number) else {
                return Some(format!("{field} must be a number"));
            };
            match (min, max) {
                (Some(lo), Some(hi)) if n < *lo || n > *hi => {
                    Some(format!("{field} must be between {lo} and {hi}"))
                }
                (Some(lo), None) if n < *lo => Some(format!("{field} must be at least {lo}")),
                (None, Some(hi)) if n > *hi => Some(format!("{field} must be at most {hi}")),
                _ => None,
            }
        }
        Check::Json => match value {
            Some(Value::String(s)) if crate::coerce::is_retained_raw(s) => {
                Some(format!("{field} is not valid JSON"))
            }
            _ => None,
        },
        Check::OneOf { values } => {
            if is_blank(value) || value.is_some_and(|v| values.contains(v)) {
                return None;
            }
            let allowed: Vec<String> = values
                .iter()
                .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
                .collect();
            Some(format!("{field} must be one of: {}", allowed.join(", ")))
        }
    }
}

/// Missing, `null`, whitespace-only, `[]` and `{}` count as empty.
pub(crate) fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(_) => false,
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => {
            let s = s.trim();
            !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false")
        }
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        None | Some(Value::Null) => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_values() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&json!(null))));
        assert!(is_blank(Some(&json!("  "))));
        assert!(is_blank(Some(&json!([]))));
        assert!(is_blank(Some(&json!({}))));
        assert!(!is_blank(Some(&json!(0))));
        assert!(!is_blank(Some(&json!(false))));
    }

    #[test]
    fn truthy_values() {
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!("yes"))));
        assert!(is_truthy(Some(&json!(1))));
        assert!(!is_truthy(Some(&json!("false"))));
        assert!(!is_truthy(Some(&json!("0"))));
        assert!(!is_truthy(Some(&json!(0.0))));
        assert!(!is_truthy(None));
    }

    #[test]
    fn numbers_from_strings() {
        assert_eq!(as_number(&json!("2.5")), Some(2.5));
        assert_eq!(as_number(&json!(" 7 ")), Some(7.0));
        assert_eq!(as_number(&json!("NaN")), None);
        assert_eq!(as_number(&json!("abc")), None);
        assert_eq!(as_number(&json!(true)), None);
    }
}
