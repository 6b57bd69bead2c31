// ── Controller facade ──
//
// The single entry point consumers use. Holds one `OpnsenseClient` and
// nothing else: every read is fetched and normalized fresh, every write
// goes straight to the appliance and reports its verdict.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use opnly_api::transport::{TlsMode, TransportConfig};
use opnly_api::{Credentials, OpnsenseClient};

use crate::aggregate;
use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::fallback::{EndpointAttempt, resolve};
use crate::model::{Rule, Snapshot, SnapshotReport};
use crate::normalize::{normalize_rule_collection, normalize_rule_rows};
use crate::requests::RuleEditRequest;
use crate::selection::SelectionField;
use crate::serialize::serialize_rule_edit;

/// Interface table used when no discovery endpoint answers.
const BUILTIN_INTERFACES: [(&str, &str); 4] = [
    ("lan", "LAN"),
    ("wan", "WAN"),
    ("opt1", "OPT1"),
    ("lo0", "Loopback"),
];

/// `result` values the filter endpoints use to acknowledge a write.
const ACCEPTED_RESULTS: [&str; 5] = ["saved", "deleted", "enabled", "disabled", "ok"];

// ── Controller ───────────────────────────────────────────────────────

/// A connection to one appliance.
///
/// Holds no cached state; two calls to [`fetch_rules`](Self::fetch_rules)
/// issue two sets of requests.
pub struct Controller {
    client: OpnsenseClient,
}

impl Controller {
    /// Build a controller from runtime configuration.
    ///
    /// No request is made here; a bad key only shows up on the first call.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let credentials = Credentials::new(config.api_key, config.api_secret);
        let client = OpnsenseClient::new(config.url, credentials, &transport)?;
        info!(url = %client.base_url(), "controller ready");
        Ok(Self { client })
    }

    /// Wrap an already-built client.
    pub fn with_client(client: OpnsenseClient) -> Self {
        Self { client }
    }

    // ── System state ─────────────────────────────────────────────────

    pub async fn fetch_snapshot(&self) -> Result<Snapshot, CoreError> {
        aggregate::fetch_snapshot(&self.client).await
    }

    pub async fn fetch_snapshot_report(&self) -> Result<SnapshotReport, CoreError> {
        aggregate::fetch_snapshot_report(&self.client).await
    }

    // ── Rules (read) ─────────────────────────────────────────────────

    /// All filter rules, empty when no rules endpoint answers.
    ///
    /// Search rows come back in the appliance's list order. The model
    /// endpoint keys rules by identifier, so its order carries no meaning.
    pub async fn fetch_rules(&self) -> Vec<Rule> {
        let chain = vec![
            EndpointAttempt::new("firewall/filter/searchRule", |body: Value| {
                body.get("rows")
                    .is_some_and(Value::is_array)
                    .then(|| normalize_rule_rows(&body))
            })
            .with_query("current", "1")
            .with_query("rowCount", "-1"),
            EndpointAttempt::new("firewall/filter/get", |body: Value| {
                body.pointer("/filter/rules/rule")
                    .is_some()
                    .then(|| normalize_rule_collection(&body))
            }),
        ];

        let resolution = resolve(&self.client, &chain, Vec::new()).await;
        debug!(
            count = resolution.value.len(),
            source = resolution.answered_by.as_deref().unwrap_or("none"),
            "fetched filter rules"
        );
        resolution.value
    }

    /// One rule by identifier.
    pub async fn fetch_rule(&self, id: &str) -> Result<Rule, CoreError> {
        self.fetch_rules()
            .await
            .into_iter()
            .find(|rule| rule.id == id)
            .ok_or_else(|| CoreError::NotFound {
                identifier: id.to_string(),
            })
    }

    /// Interface key → display label, in the order the appliance lists them.
    ///
    /// Falls back to a built-in table of common interfaces when discovery fails.
    pub async fn fetch_available_interfaces(&self) -> IndexMap<String, String> {
        let chain = vec![
            EndpointAttempt::new("firewall/filter/getInterfaceList", |body: Value| {
                non_empty(interface_items(&body))
            }),
            EndpointAttempt::new("diagnostics/interface/getInterfaceNames", |body: Value| {
                non_empty(flat_interface_map(&body))
            }),
            EndpointAttempt::new("firewall/filter/getRule", |body: Value| {
                let field = body.pointer("/rule/interface").map(SelectionField::from)?;
                non_empty(field.options().into_iter().collect())
            }),
        ];

        let resolution = resolve(&self.client, &chain, builtin_interfaces()).await;
        if !resolution.succeeded() {
            debug!("interface discovery failed, using built-in table");
        }
        resolution.value
    }

    // ── Rules (write) ────────────────────────────────────────────────

    /// Create or update a rule, returning its identifier.
    pub async fn submit_rule_edit(&self, edit: &RuleEditRequest) -> Result<String, CoreError> {
        let payload = serialize_rule_edit(edit);

        if let Some(uuid) = edit.uuid.as_deref() {
            let body = self
                .client
                .set_filter_rule(uuid, &payload)
                .await
                .map_err(|e| write_error(e, uuid))?;
            ensure_accepted(&body, uuid)?;
            return Ok(uuid.to_string());
        }

        let body = self.client.add_filter_rule(&payload).await?;
        ensure_accepted(&body, "new rule")?;
        body.get("uuid")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .ok_or_else(|| {
                CoreError::Internal("appliance saved the rule but returned no identifier".into())
            })
    }

    pub async fn delete_rule(&self, rule: &Rule) -> Result<(), CoreError> {
        ensure_editable(rule)?;
        let body = self
            .client
            .delete_filter_rule(&rule.id)
            .await
            .map_err(|e| write_error(e, &rule.id))?;
        ensure_accepted(&body, &rule.id)
    }

    /// Flip a rule between enabled and disabled.
    pub async fn toggle_rule(&self, rule: &Rule) -> Result<(), CoreError> {
        ensure_editable(rule)?;
        let body = self
            .client
            .toggle_filter_rule(&rule.id)
            .await
            .map_err(|e| write_error(e, &rule.id))?;
        ensure_accepted(&body, &rule.id)
    }

    /// Activate pending filter changes on the appliance.
    pub async fn apply_changes(&self) -> Result<(), CoreError> {
        let body = self.client.apply_filter().await?;
        match body.get("status").and_then(Value::as_str).map(str::trim) {
            Some(status) if !status.eq_ignore_ascii_case("ok") => Err(CoreError::Rejected {
                message: format!("apply returned status {status:?}"),
            }),
            _ => Ok(()),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

fn ensure_editable(rule: &Rule) -> Result<(), CoreError> {
    if rule.is_editable() {
        Ok(())
    } else {
        Err(CoreError::ReadOnlyRule {
            identifier: rule.id.clone(),
        })
    }
}

/// Write errors that name a missing rule should name it by identifier.
fn write_error(err: opnly_api::Error, identifier: &str) -> CoreError {
    if err.is_not_found() {
        return CoreError::NotFound {
            identifier: identifier.to_string(),
        };
    }
    CoreError::from(err)
}

/// Check the `result` of a 2xx write response.
///
/// The filter endpoints answer `{"result": "failed", "validations": {...}}`
/// with HTTP 200 when a rule does not validate.
fn ensure_accepted(body: &Value, identifier: &str) -> Result<(), CoreError> {
    if let Some(message) = validation_message(body) {
        return Err(CoreError::ValidationFailed { message });
    }

    let Some(result) = body.get("result").and_then(Value::as_str) else {
        return Ok(());
    };
    let result = result.trim();
    if ACCEPTED_RESULTS.iter().any(|r| r.eq_ignore_ascii_case(result)) {
        return Ok(());
    }
    if result.eq_ignore_ascii_case("not found") {
        return Err(CoreError::NotFound {
            identifier: identifier.to_string(),
        });
    }
    Err(CoreError::ValidationFailed {
        message: format!("appliance reported result {result:?}"),
    })
}

/// Join a `validations` object into `field: message; field: message`.
fn validation_message(body: &Value) -> Option<String> {
    let validations = body.get("validations")?.as_object()?;
    let parts: Vec<String> = validations
        .iter()
        .map(|(field, message)| {
            let message = match message {
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                other => other.to_string(),
            };
            format!("{field}: {message}")
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("; "))
}

fn builtin_interfaces() -> IndexMap<String, String> {
    BUILTIN_INTERFACES
        .iter()
        .map(|(key, label)| ((*key).to_string(), (*label).to_string()))
        .collect()
}

fn non_empty(map: IndexMap<String, String>) -> Option<IndexMap<String, String>> {
    (!map.is_empty()).then_some(map)
}

/// `{"interfaces": {"items": [{"value": "lan", "label": "LAN"}, ...]}}`
fn interface_items(body: &Value) -> IndexMap<String, String> {
    body.pointer("/interfaces/items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let key = item.get("value").and_then(Value::as_str)?;
                    let label = item.get("label").and_then(Value::as_str).unwrap_or(key);
                    Some((key.to_string(), label.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `{"lan": "LAN", "wan": "WAN"}`
fn flat_interface_map(body: &Value) -> IndexMap<String, String> {
    body.as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(key, label)| Some((key.clone(), label.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn validations_are_joined_per_field() {
        let body = json!({
            "result": "failed",
            "validations": {
                "rule.source_port": "Please specify a valid port.",
                "rule.destination_net": ["Not a network.", "Required."]
            }
        });

        let err = ensure_accepted(&body, "u1").unwrap_err();

        match err {
            CoreError::ValidationFailed { message } => assert_eq!(
                message,
                "rule.source_port: Please specify a valid port.; \
                 rule.destination_net: Not a network., Required."
            ),
            other => panic!("expected ValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn failed_result_without_validations_is_rejected() {
        let err = ensure_accepted(&json!({"result": "failed"}), "u1").unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }

    #[test]
    fn accepted_results_pass() {
        for result in ["saved", "Deleted", "Enabled", "disabled"] {
            assert!(ensure_accepted(&json!({ "result": result }), "u1").is_ok());
        }
        assert!(ensure_accepted(&Value::Null, "u1").is_ok());
    }

    #[test]
    fn not_found_result_names_rule() {
        let err = ensure_accepted(&json!({"result": "not found"}), "gone").unwrap_err();
        assert!(matches!(err, CoreError::NotFound { identifier } if identifier == "gone"));
    }

    #[test]
    fn interface_shapes_are_read() {
        let items = json!({"interfaces": {"items": [
            {"value": "lan", "label": "LAN"},
            {"value": "opt2"},
            {"label": "orphan"}
        ]}});
        let map = interface_items(&items);
        assert_eq!(map.get("lan").map(String::as_str), Some("LAN"));
        assert_eq!(map.get("opt2").map(String::as_str), Some("opt2"));
        assert_eq!(map.len(), 2);

        let flat = flat_interface_map(&json!({"wan": "WAN", "bad": 1}));
        assert_eq!(flat.keys().map(String::as_str).collect::<Vec<_>>(), vec!["wan"]);
    }

    #[test]
    fn builtin_table_has_four_entries_in_order() {
        let table = builtin_interfaces();
        assert_eq!(
            table.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["lan", "wan", "opt1", "lo0"]
        );
        assert_eq!(table["lo0"], "Loopback");
    }
}
