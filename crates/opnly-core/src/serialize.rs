// ── Rule write serialization ──
//
// Turns a `RuleEditRequest` into the `rule` object the filter endpoints
// accept. Outbound field names differ from the ones the read endpoints
// return (`type` vs `action`, `source` vs `source_net`), and the appliance
// rejects port fields on protocols that have no ports.

use serde_json::{Map, Value};

use crate::model::rule::protocol_uses_ports;
use crate::requests::RuleEditRequest;

const ANY: &str = "any";

/// Outbound name → inbound name, for fields whose names differ.
const RENAMED_ON_READ: [(&str, &str); 3] = [
    ("type", "action"),
    ("source", "source_net"),
    ("destination", "destination_net"),
];

/// Build the outbound payload for a rule create or update.
pub fn serialize_rule_edit(edit: &RuleEditRequest) -> Map<String, Value> {
    let mut out = Map::new();

    out.insert("type".into(), Value::String(edit.action.to_string()));
    out.insert("interface".into(), Value::String(edit.interface.clone()));
    out.insert("protocol".into(), Value::String(outbound_protocol(&edit.protocol)));
    out.insert("source".into(), Value::String(network_or_any(&edit.source)));
    out.insert(
        "destination".into(),
        Value::String(network_or_any(&edit.destination)),
    );

    if protocol_uses_ports(&edit.protocol) {
        for (name, port) in [
            ("source_port", &edit.source_port),
            ("destination_port", &edit.destination_port),
        ] {
            if let Some(port) = specific_port(port.as_deref()) {
                out.insert(name.into(), Value::String(port.to_string()));
            }
        }
    }

    let description = match edit.description.as_deref() {
        None | Some("null") => String::new(),
        Some(text) => text.to_string(),
    };
    out.insert("description".into(), Value::String(description));
    out.insert(
        "enabled".into(),
        Value::String(if edit.enabled { "1" } else { "0" }.into()),
    );
    out.insert("sequence".into(), Value::String(edit.sequence.to_string()));

    out
}

/// Rename an outbound payload back onto the field names the read endpoints
/// use, so it can be fed to [`normalize_rule`](crate::normalize::normalize_rule).
pub fn payload_to_raw_rule(payload: &Map<String, Value>) -> Value {
    let raw = payload
        .iter()
        .map(|(name, value)| {
            let inbound = RENAMED_ON_READ
                .iter()
                .find(|(outbound, _)| *outbound == name.as_str())
                .map_or(name.as_str(), |(_, inbound)| *inbound);
            (inbound.to_string(), value.clone())
        })
        .collect();
    Value::Object(raw)
}

fn outbound_protocol(protocol: &str) -> String {
    let protocol = protocol.trim();
    if protocol.is_empty() || protocol.eq_ignore_ascii_case(ANY) {
        ANY.into()
    } else {
        protocol.to_uppercase()
    }
}

fn network_or_any(network: &str) -> String {
    if network.trim().is_empty() {
        ANY.into()
    } else {
        network.to_string()
    }
}

fn specific_port(port: Option<&str>) -> Option<&str> {
    port.filter(|p| {
        let p = p.trim();
        !p.is_empty() && !p.eq_ignore_ascii_case(ANY)
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::RuleAction;
    use crate::normalize::normalize_rule;

    fn tcp_edit() -> RuleEditRequest {
        RuleEditRequest {
            action: RuleAction::Block,
            protocol: "tcp".into(),
            source: "192.168.1.0/24".into(),
            destination: "10.0.0.5".into(),
            source_port: Some("any".into()),
            destination_port: Some("22".into()),
            description: Some("ssh".into()),
            sequence: 7,
            ..RuleEditRequest::create("lan")
        }
    }

    #[test]
    fn tcp_edit_keeps_specific_ports_only() {
        let payload = serialize_rule_edit(&tcp_edit());

        assert_eq!(
            Value::Object(payload),
            json!({
                "type": "block",
                "interface": "lan",
                "protocol": "TCP",
                "source": "192.168.1.0/24",
                "destination": "10.0.0.5",
                "destination_port": "22",
                "description": "ssh",
                "enabled": "1",
                "sequence": "7"
            })
        );
    }

    #[test]
    fn portless_protocol_drops_both_ports() {
        let edit = RuleEditRequest {
            protocol: "icmp".into(),
            source_port: Some("53".into()),
            destination_port: Some("80".into()),
            ..tcp_edit()
        };

        let payload = serialize_rule_edit(&edit);

        assert_eq!(payload["protocol"], "ICMP");
        assert!(!payload.contains_key("source_port"));
        assert!(!payload.contains_key("destination_port"));
    }

    #[test]
    fn any_protocol_stays_lowercase() {
        let edit = RuleEditRequest {
            protocol: "ANY".into(),
            ..tcp_edit()
        };
        let payload = serialize_rule_edit(&edit);
        assert_eq!(payload["protocol"], "any");
        assert!(!payload.contains_key("destination_port"));
    }

    #[test]
    fn blank_networks_become_any() {
        let edit = RuleEditRequest {
            source: "  ".into(),
            destination: String::new(),
            ..tcp_edit()
        };
        let payload = serialize_rule_edit(&edit);
        assert_eq!(payload["source"], "any");
        assert_eq!(payload["destination"], "any");
    }

    #[test]
    fn null_or_missing_description_is_empty() {
        for description in [None, Some("null".to_string())] {
            let edit = RuleEditRequest {
                description,
                enabled: false,
                ..tcp_edit()
            };
            let payload = serialize_rule_edit(&edit);
            assert_eq!(payload["description"], "");
            assert_eq!(payload["enabled"], "0");
        }
    }

    #[test]
    fn payload_renames_back_to_read_names() {
        let raw = payload_to_raw_rule(&serialize_rule_edit(&tcp_edit()));

        assert_eq!(raw["action"], "block");
        assert_eq!(raw["source_net"], "192.168.1.0/24");
        assert_eq!(raw["destination_net"], "10.0.0.5");
        assert!(raw.get("type").is_none());
    }

    #[test]
    fn reserializing_a_read_back_edit_is_idempotent() {
        let edits = [
            tcp_edit(),
            RuleEditRequest {
                protocol: "udp".into(),
                source_port: Some("5353".into()),
                destination_port: None,
                description: Some("null".into()),
                ..tcp_edit()
            },
            RuleEditRequest {
                protocol: "ipv6-icmp".into(),
                ..RuleEditRequest::create("wan")
            },
        ];

        for edit in edits {
            let first = serialize_rule_edit(&edit);
            let rule = normalize_rule(&payload_to_raw_rule(&first)).expect("readable payload");
            let again = RuleEditRequest::from_rule(&rule).expect("user rule");
            let second = serialize_rule_edit(&again);
            assert_eq!(first, second);
        }
    }
}
