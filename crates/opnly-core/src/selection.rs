// ── Selection fields ──
//
// OPNsense returns the same enumerated field three ways: a plain string
// (search endpoints), a list (multi-select fields), or an option map
// `{"pass": {"value": "Pass", "selected": 1}, "block": {...}}` (model
// `get` endpoints). `SelectionField` is that union made explicit at the
// deserialization boundary.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One candidate in an option map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOption {
    pub key: String,
    pub label: Option<String>,
    pub selected: bool,
}

/// An enumerated field in any of its wire encodings.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionField {
    Scalar(String),
    /// First element is authoritative.
    List(Vec<Value>),
    /// Candidates in mapping order.
    OptionMap(Vec<SelectionOption>),
    #[default]
    Unrecognized,
}

impl SelectionField {
    /// Resolve to a concrete value.
    ///
    /// With `want_label`, an option map yields the selected entry's display
    /// label when it has one; otherwise its key. No selection, an empty
    /// list, or an unrecognized shape all resolve to `""`.
    pub fn resolve(&self, want_label: bool) -> String {
        match self {
            Self::Scalar(s) => s.clone(),
            Self::List(items) => items.first().map(value_string).unwrap_or_default(),
            Self::OptionMap(options) => options
                .iter()
                .find(|o| o.selected)
                .map(|o| match (&o.label, want_label) {
                    (Some(label), true) => label.clone(),
                    _ => o.key.clone(),
                })
                .unwrap_or_default(),
            Self::Unrecognized => String::new(),
        }
    }

    /// All `(key, label)` candidates of an option map, label defaulting to the key.
    pub fn options(&self) -> Vec<(String, String)> {
        match self {
            Self::OptionMap(options) => options
                .iter()
                .map(|o| (o.key.clone(), o.label.clone().unwrap_or_else(|| o.key.clone())))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl From<&Value> for SelectionField {
    fn from(raw: &Value) -> Self {
        match raw {
            Value::String(s) => Self::Scalar(s.clone()),
            Value::Array(items) => Self::List(items.clone()),
            Value::Object(map) => Self::OptionMap(
                map.iter()
                    .map(|(key, meta)| SelectionOption {
                        key: key.clone(),
                        label: meta
                            .get("value")
                            .or_else(|| meta.get("label"))
                            .and_then(Value::as_str)
                            .map(String::from),
                        selected: meta.get("selected").is_some_and(is_selected_flag),
                    })
                    .collect(),
            ),
            _ => Self::Unrecognized,
        }
    }
}

impl<'de> Deserialize<'de> for SelectionField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from(&raw))
    }
}

/// Resolve a raw JSON value as a selection field.
pub fn resolve_selection(raw: &Value, want_label: bool) -> String {
    SelectionField::from(raw).resolve(want_label)
}

/// `selected` is `1` on most endpoints and `"1"` on a few.
fn is_selected_flag(flag: &Value) -> bool {
    match flag {
        Value::Number(n) => {
            n.as_u64() == Some(1) || n.as_f64().is_some_and(|f| (f - 1.0).abs() < f64::EPSILON)
        }
        Value::String(s) => s == "1",
        _ => false,
    }
}

fn value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
