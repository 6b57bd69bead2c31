// ── Firewall rule domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What a rule does with matching traffic.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RuleAction {
    #[default]
    Pass,
    Block,
    Reject,
}

/// Protocols for which source/destination ports are meaningful.
pub const PORT_PROTOCOLS: [&str; 3] = ["tcp", "udp", "tcp/udp"];

/// Canonical firewall filter rule.
///
/// Built fresh on every fetch. Only `id` is stable across fetches; edits
/// go out through [`RuleEditRequest`](crate::RuleEditRequest) and come
/// back on the next read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub action: RuleAction,
    pub interface: String,
    pub protocol: String,
    pub source: String,
    pub destination: String,
    pub source_port: String,
    pub destination_port: String,
    pub description: String,
    pub enabled: bool,
    pub sequence: i64,
    /// Non-empty for rules the appliance generated itself (anti-lockout,
    /// plugin-managed rules). Those are read-only to opnly.
    pub origin: String,
}

impl Rule {
    pub fn is_editable(&self) -> bool {
        self.origin.is_empty()
    }

    /// Whether the protocol carries ports (tcp, udp, tcp/udp).
    pub fn uses_ports(&self) -> bool {
        protocol_uses_ports(&self.protocol)
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            id: String::new(),
            action: RuleAction::Pass,
            interface: String::new(),
            protocol: "any".into(),
            source: "any".into(),
            destination: "any".into(),
            source_port: "any".into(),
            destination_port: "any".into(),
            description: String::new(),
            enabled: false,
            sequence: 0,
            origin: String::new(),
        }
    }
}

pub(crate) fn protocol_uses_ports(protocol: &str) -> bool {
    let protocol = protocol.trim();
    PORT_PROTOCOLS
        .iter()
        .any(|p| p.eq_ignore_ascii_case(protocol))
}
