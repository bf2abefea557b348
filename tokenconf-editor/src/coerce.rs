//! Text surface for structured field values.
//!
//! Map- and array-valued fields are edited as free text. Parsing is
//! forgiving: text that is not valid JSON is kept verbatim as a string value
//! so the user's keystrokes survive until they fix it.

use serde_json::Value;
use tracing::debug;

/// Outcome of reading a text field back.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// The text was valid JSON (blank text parses as `null`).
    Parsed(Value),
    /// The text was not valid JSON and is kept as-is.
    Raw(String),
}

impl Coerced {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Coerced::Parsed(_))
    }

    /// The value to store.
    pub fn into_value(self) -> Value {
        match self {
            Coerced::Parsed(value) => value,
            Coerced::Raw(text) => Value::String(text),
        }
    }
}

/// Renders a stored value for editing.
///
/// Absent and `null` render as `""`. A string that is itself unparseable
/// text renders verbatim, so retained raw input reads back exactly as typed;
/// every other value is pretty-printed JSON.
pub fn to_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) if is_retained_raw(s) => s.clone(),
        Some(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
    }
}

/// Parses edited text. Never fails.
pub fn from_text(text: &str) -> Coerced {
    if text.trim().is_empty() {
        return Coerced::Parsed(Value::Null);
    }
    match serde_json::from_str(text) {
        Ok(value) => Coerced::Parsed(value),
        Err(e) => {
            debug!(error = %e, len = text.len(), "Keeping raw text for unparseable JSON");
            Coerced::Raw(text.to_string())
        }
    }
}

/// Replaces a string holding a JSON object or array with the structure.
/// Anything else is returned unchanged.
pub fn flatten(value: &Value) -> Value {
    if let Value::String(s) = value {
        if let Ok(parsed @ (Value::Object(_) | Value::Array(_))) = serde_json::from_str::<Value>(s) {
            return parsed;
        }
    }
    value.clone()
}

/// True for a string that [`from_text`] would keep as [`Coerced::Raw`].
pub fn is_retained_raw(s: &str) -> bool {
    !s.trim().is_empty() && serde_json::from_str::<Value>(s).is_err()
}
