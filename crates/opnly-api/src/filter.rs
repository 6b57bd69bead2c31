// Firewall filter write endpoints
//
// Rule mutations under `firewall/filter/*`. Reads go through the generic
// `request` path because their shape varies by firmware; writes have a
// single stable endpoint each.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::client::OpnsenseClient;
use crate::error::Error;

impl OpnsenseClient {
    /// Create a filter rule.
    ///
    /// `POST /api/firewall/filter/addRule` with `{"rule": {...}}`.
    /// The response carries `{"result": "saved", "uuid": "..."}` on success
    /// or `{"result": "failed", "validations": {...}}` when rejected.
    pub async fn add_filter_rule(&self, rule: &Map<String, Value>) -> Result<Value, Error> {
        debug!("adding filter rule");
        self.post_json("firewall/filter/addRule", &json!({ "rule": rule }))
            .await
    }

    /// Replace an existing filter rule.
    ///
    /// `POST /api/firewall/filter/setRule/{uuid}`
    pub async fn set_filter_rule(
        &self,
        uuid: &str,
        rule: &Map<String, Value>,
    ) -> Result<Value, Error> {
        debug!(uuid, "updating filter rule");
        self.post_json(
            &format!("firewall/filter/setRule/{}", encode_segment(uuid)),
            &json!({ "rule": rule }),
        )
        .await
    }

    /// Delete a filter rule.
    ///
    /// `POST /api/firewall/filter/delRule/{uuid}`
    pub async fn delete_filter_rule(&self, uuid: &str) -> Result<Value, Error> {
        debug!(uuid, "deleting filter rule");
        self.post_json(
            &format!("firewall/filter/delRule/{}", encode_segment(uuid)),
            &json!({}),
        )
        .await
    }

    /// Flip a filter rule's enabled flag.
    ///
    /// `POST /api/firewall/filter/toggleRule/{uuid}`
    pub async fn toggle_filter_rule(&self, uuid: &str) -> Result<Value, Error> {
        debug!(uuid, "toggling filter rule");
        self.post_json(
            &format!("firewall/filter/toggleRule/{}", encode_segment(uuid)),
            &json!({}),
        )
        .await
    }

    /// Activate pending filter changes.
    ///
    /// `POST /api/firewall/filter/apply`
    pub async fn apply_filter(&self) -> Result<Value, Error> {
        debug!("applying filter changes");
        self.post_json("firewall/filter/apply", &json!({})).await
    }
}

fn encode_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
