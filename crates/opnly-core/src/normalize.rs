// ── Rule normalization ──
//
// Maps raw filter-rule payloads into canonical `Rule`s. The search
// endpoint returns flat rows with display strings; the model `get`
// endpoint nests rules under `filter.rules.rule`, keyed by UUID, with
// enumerated fields as option maps. Both feed through `normalize_rule`.

use std::str::FromStr;

use serde_json::Value;
use tracing::trace;

use crate::model::{Rule, RuleAction};
use crate::selection::resolve_selection;

const ANY: &str = "any";

/// Normalize one raw rule object.
///
/// Returns `None` for malformed entries: anything that is not an object,
/// or an action that is neither pass, block nor reject.
pub fn normalize_rule(raw: &Value) -> Option<Rule> {
    normalize_keyed(None, raw)
}

/// Normalize the rule collection nested at `filter.rules.rule`.
pub fn normalize_rule_collection(raw: &Value) -> Vec<Rule> {
    raw.pointer("/filter/rules/rule")
        .map(normalize_rule_items)
        .unwrap_or_default()
}

/// Normalize the `rows` array of a search response.
pub fn normalize_rule_rows(raw: &Value) -> Vec<Rule> {
    raw.get("rows").map(normalize_rule_items).unwrap_or_default()
}

/// Normalize a list of rule objects, or a mapping of identifier to rule.
///
/// List order is preserved. Mapping order is whatever the appliance sent
/// and carries no meaning; each mapping key becomes the rule's `id` when
/// the entry has no identifier of its own. Malformed entries are dropped.
pub fn normalize_rule_items(items: &Value) -> Vec<Rule> {
    match items {
        Value::Array(list) => list
            .iter()
            .filter_map(|item| keep_or_drop(None, item))
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, item)| keep_or_drop(Some(key), item))
            .collect(),
        _ => Vec::new(),
    }
}

fn keep_or_drop(key: Option<&str>, item: &Value) -> Option<Rule> {
    let rule = normalize_keyed(key, item);
    if rule.is_none() {
        trace!(?key, "dropping malformed rule entry");
    }
    rule
}

fn normalize_keyed(key: Option<&str>, raw: &Value) -> Option<Rule> {
    if !raw.is_object() {
        return None;
    }

    let action = match selection(raw, "action", false).as_str() {
        "" => RuleAction::default(),
        other => RuleAction::from_str(other).ok()?,
    };

    let id = [text(raw, "uuid"), text(raw, "id")]
        .into_iter()
        .find(|s| !s.is_empty())
        .or_else(|| key.map(String::from))
        .unwrap_or_default();

    let description = [text(raw, "description"), text(raw, "descr")]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or_default();

    Some(Rule {
        id,
        action,
        interface: selection(raw, "interface", true),
        protocol: or_any(selection(raw, "protocol", false)),
        source: or_any(text(raw, "source_net")),
        destination: or_any(text(raw, "destination_net")),
        source_port: or_any(text(raw, "source_port")),
        destination_port: or_any(text(raw, "destination_port")),
        description,
        enabled: flag(raw.get("enabled")),
        sequence: integer(raw.get("sequence")),
        origin: text(raw, "origin"),
    })
}

// ── Field readers ───────────────────────────────────────────────────

/// Scalar fields pass through; option maps and lists are resolved.
fn selection(raw: &Value, key: &str, want_label: bool) -> String {
    raw.get(key)
        .map(|v| resolve_selection(v, want_label))
        .unwrap_or_default()
}

fn text(raw: &Value, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn or_any(value: String) -> String {
    if value.trim().is_empty() {
        ANY.into()
    } else {
        value
    }
}

fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s == "1",
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

fn integer(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        _ => 0,
    }
}
