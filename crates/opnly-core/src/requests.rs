// ── Typed request structs for rule writes ──

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{Rule, RuleAction};

/// A create or update of one filter rule, before wire serialization.
///
/// `uuid == None` creates a new rule; `Some` replaces the rule with that
/// identifier. Ports and description are optional because the wire format
/// treats "absent" and "any" differently depending on the protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEditRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub action: RuleAction,
    pub interface: String,
    #[serde(default = "any")]
    pub protocol: String,
    #[serde(default = "any")]
    pub source: String,
    #[serde(default = "any")]
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub sequence: i64,
}

fn any() -> String {
    "any".into()
}

fn enabled_by_default() -> bool {
    true
}

impl RuleEditRequest {
    /// A new-rule request on `interface` with everything else at defaults.
    pub fn create(interface: impl Into<String>) -> Self {
        Self {
            uuid: None,
            action: RuleAction::Pass,
            interface: interface.into(),
            protocol: any(),
            source: any(),
            destination: any(),
            source_port: None,
            destination_port: None,
            description: None,
            enabled: true,
            sequence: 0,
        }
    }

    /// An update request that rewrites `rule` with its current values.
    ///
    /// Device-managed rules are refused.
    pub fn from_rule(rule: &Rule) -> Result<Self, CoreError> {
        if !rule.is_editable() {
            return Err(CoreError::ReadOnlyRule {
                identifier: rule.id.clone(),
            });
        }
        Ok(Self {
            uuid: Some(rule.id.clone()).filter(|id| !id.is_empty()),
            action: rule.action,
            interface: rule.interface.clone(),
            protocol: rule.protocol.clone(),
            source: rule.source.clone(),
            destination: rule.destination.clone(),
            source_port: Some(rule.source_port.clone()),
            destination_port: Some(rule.destination_port.clone()),
            description: Some(rule.description.clone()),
            enabled: rule.enabled,
            sequence: rule.sequence,
        })
    }

    pub fn is_create(&self) -> bool {
        self.uuid.is_none()
    }
}
