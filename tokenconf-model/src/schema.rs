//! Declarative editor schema: which collections exist, how they delete,
//! what they default to, and which rules validation applies.
//!
//! Schemas are usually loaded from TOML:
//!
//! ```toml
//! strip_fields = ["requiresProject"]
//!
//! [root]
//! json_fields = ["metadata"]
//! defaults = { has_royalty = false }
//!
//! [[root.rules]]
//! field = "royalty_percentage"
//! check = "required_if"
//! flag = "has_royalty"
//!
//! [collections.tokenTypes]
//! policy = "hard"
//! min_active = 1
//! ```

use crate::{DELETED_MARKER, DeletePolicy, Fields, ID_MARKER, NEW_RECORD, REMOVE_RECORD};
use crate::error::{SchemaError, SchemaResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Whether a finding blocks submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks assembly.
    #[default]
    Issue,
    /// Advisory only.
    Warning,
}

/// The generic checks the validation engine knows how to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Check {
    /// Field must be present and non-blank.
    Required,
    /// Numeric value (number or numeric string) within inclusive bounds.
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// Field must be non-blank while `flag` (same record) is truthy.
    RequiredIf { flag: String },
    /// String value must parse as JSON.
    Json,
    /// Value must equal one of `values`.
    OneOf { values: Vec<Value> },
}

/// One check bound to one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub field: String,
    #[serde(flatten)]
    pub check: Check,
    #[serde(default)]
    pub severity: Severity,
    /// Overrides the built-in message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldRule {
    fn new(field: &str, check: Check) -> Self {
        Self {
            field: field.into(),
            check,
            severity: Severity::Issue,
            message: None,
        }
    }

    /// Shorthand for a presence rule.
    pub fn required(field: &str) -> Self {
        Self::new(field, Check::Required)
    }

    /// Shorthand for an inclusive numeric range.
    pub fn range(field: &str, min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(field, Check::Range { min, max })
    }

    /// Shorthand for a 0–100 percentage.
    pub fn percentage(field: &str) -> Self {
        Self::range(field, Some(0.0), Some(100.0))
    }

    /// Shorthand for "required while `flag` is on".
    pub fn required_if(field: &str, flag: &str) -> Self {
        Self::new(field, Check::RequiredIf { flag: flag.into() })
    }

    /// Shorthand for a JSON-text format rule.
    pub fn json(field: &str) -> Self {
        Self::new(field, Check::Json)
    }

    /// Shorthand for an enumerated value.
    pub fn one_of(field: &str, values: Vec<Value>) -> Self {
        Self::new(field, Check::OneOf { values })
    }

    /// Downgrade to an advisory warning.
    #[must_use]
    pub fn warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Defaults, JSON-text fields and rules for the root record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RootSpec {
    #[serde(default)]
    pub defaults: Fields,
    /// Fields whose structured value is edited as text.
    #[serde(default)]
    pub json_fields: Vec<String>,
    #[serde(default)]
    pub rules: Vec<FieldRule>,
}

/// Declaration of one named collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionSpec {
    #[serde(default)]
    pub policy: DeletePolicy,
    /// Minimum number of non-deleted records.
    #[serde(default)]
    pub min_active: usize,
    /// Layered under the caller's defaults on every append.
    #[serde(default)]
    pub defaults: Fields,
    #[serde(default)]
    pub json_fields: Vec<String>,
    #[serde(default)]
    pub rules: Vec<FieldRule>,
}

impl CollectionSpec {
    pub fn new(policy: DeletePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn min_active(mut self, min: usize) -> Self {
        self.min_active = min;
        self
    }

    #[must_use]
    pub fn default_value(mut self, field: &str, value: Value) -> Self {
        self.defaults.insert(field.into(), value);
        self
    }

    #[must_use]
    pub fn json_field(mut self, field: &str) -> Self {
        self.json_fields.push(field.into());
        self
    }

    #[must_use]
    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn is_json_field(&self, field: &str) -> bool {
        self.json_fields.iter().any(|f| f == field)
    }
}

/// The full shape of one kind of token configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorSchema {
    #[serde(default)]
    pub root: RootSpec,
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionSpec>,
    /// Keys removed recursively from assembled output.
    #[serde(default)]
    pub strip_fields: Vec<String>,
}

impl EditorSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and checks a TOML schema.
    pub fn from_toml_str(contents: &str) -> SchemaResult<Self> {
        let schema: Self = toml::from_str(contents)?;
        schema.check()?;
        Ok(schema)
    }

    /// Loads a schema file from disk.
    pub fn load_from(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let schema = Self::from_toml_str(&contents)?;
        info!(
            path = %path.display(),
            collections = schema.collections.len(),
            "Loaded editor schema"
        );
        Ok(schema)
    }

    #[must_use]
    pub fn root_default(mut self, field: &str, value: Value) -> Self {
        self.root.defaults.insert(field.into(), value);
        self
    }

    #[must_use]
    pub fn root_json_field(mut self, field: &str) -> Self {
        self.root.json_fields.push(field.into());
        self
    }

    #[must_use]
    pub fn root_rule(mut self, rule: FieldRule) -> Self {
        self.root.rules.push(rule);
        self
    }

    #[must_use]
    pub fn collection(mut self, name: &str, spec: CollectionSpec) -> Self {
        self.collections.insert(name.into(), spec);
        self
    }

    #[must_use]
    pub fn strip_field(mut self, field: &str) -> Self {
        self.strip_fields.push(field.into());
        self
    }

    pub fn collection_spec(&self, name: &str) -> Option<&CollectionSpec> {
        self.collections.get(name)
    }

    pub fn is_root_json_field(&self, field: &str) -> bool {
        self.root.json_fields.iter().any(|f| f == field)
    }

    /// Rejects schemas the editor could not honour.
    pub fn check(&self) -> SchemaResult<()> {
        check_rules("root", &self.root.rules)?;
        for (name, spec) in &self.collections {
            if name.is_empty() {
                return Err(SchemaError::Invalid("collection name is empty".into()));
            }
            if [NEW_RECORD, REMOVE_RECORD, DELETED_MARKER, ID_MARKER].contains(&name.as_str()) {
                return Err(SchemaError::Invalid(format!(
                    "collection name '{name}' is reserved"
                )));
            }
            if self.root.defaults.contains_key(name) {
                return Err(SchemaError::Invalid(format!(
                    "root default '{name}' shadows a collection"
                )));
            }
            check_rules(name, &spec.rules)?;
        }
        Ok(())
    }
}

fn check_rules(owner: &str, rules: &[FieldRule]) -> SchemaResult<()> {
    for rule in rules {
        if rule.field.is_empty() {
            return Err(SchemaError::Invalid(format!("{owner}: rule without a field")));
        }
        if let Check::Range {
            min: Some(min),
            max: Some(max),
        } = rule.check
        {
            if min > max {
                return Err(SchemaError::Invalid(format!(
                    "{owner}.{}: range min {min} exceeds max {max}",
                    rule.field
                )));
            }
        }
    }
    Ok(())
}
