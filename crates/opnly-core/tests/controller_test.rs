#![allow(clippy::unwrap_used)]
// Integration tests for `Controller` reads and writes using wiremock.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use opnly_api::{Credentials, OpnsenseClient};
use opnly_core::{
    Controller, ControllerConfig, CoreError, Rule, RuleAction, RuleEditRequest, TlsVerification,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Controller) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let credentials = Credentials::new("key", "secret".to_string().into());
    let client = OpnsenseClient::with_client(reqwest::Client::new(), base_url, credentials);
    (server, Controller::with_client(client))
}

async fn mount_get(server: &MockServer, api_path: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/{api_path}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_post(server: &MockServer, api_path: &str, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(format!("/api/{api_path}")))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

fn user_rule(id: &str) -> Rule {
    Rule {
        id: id.into(),
        interface: "lan".into(),
        enabled: true,
        ..Rule::default()
    }
}

// ── Rule reads ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_rules_falls_back_to_model_endpoint() {
    let (server, controller) = setup().await;

    // searchRule is not mounted: the mock server answers 404.
    mount_get(
        &server,
        "firewall/filter/get",
        json!({"filter":{"rules":{"rule":{"u1":{
            "action":"pass","interface":"lan","protocol":"TCP",
            "source_net":"any","destination_net":"10.0.0.5",
            "destination_port":"22","descr":"ssh","enabled":"1","sequence":"1"
        }}}}}),
    )
    .await;

    let rules = controller.fetch_rules().await;

    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].id, "u1");
    assert_eq!(rules[0].action, RuleAction::Pass);
    assert_eq!(rules[0].destination_port, "22");
    assert_eq!(rules[0].description, "ssh");
    assert!(rules[0].enabled);
}

#[tokio::test]
async fn test_fetch_rules_prefers_search_rows() {
    let (server, controller) = setup().await;

    mount_get(
        &server,
        "firewall/filter/searchRule",
        json!({"rows": [
            {"uuid": "r2", "action": "Block", "interface": "WAN", "enabled": "1", "sequence": "2"},
            {"uuid": "r1", "action": "Pass", "interface": "LAN", "enabled": "0", "sequence": "1",
             "origin": "internal"}
        ], "total": 2}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/firewall/filter/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let rules = controller.fetch_rules().await;

    assert_eq!(
        rules.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
        vec!["r2", "r1"]
    );
    assert_eq!(rules[0].action, RuleAction::Block);
    assert!(!rules[1].is_editable());
}

#[tokio::test]
async fn test_fetch_rules_skips_unrecognized_search_shape() {
    let (server, controller) = setup().await;

    mount_get(&server, "firewall/filter/searchRule", json!({"total": 0})).await;
    mount_get(
        &server,
        "firewall/filter/get",
        json!({"filter": {"rules": {"rule": [{"uuid": "x", "action": "reject"}]}}}),
    )
    .await;

    let rules = controller.fetch_rules().await;

    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].action, RuleAction::Reject);
}

#[tokio::test]
async fn test_fetch_rules_total_failure_is_empty() {
    let (_server, controller) = setup().await;
    assert!(controller.fetch_rules().await.is_empty());
}

#[tokio::test]
async fn test_fetch_rule_by_id() {
    let (server, controller) = setup().await;

    mount_get(
        &server,
        "firewall/filter/searchRule",
        json!({"rows": [{"uuid": "a"}, {"uuid": "b", "descr": "second"}]}),
    )
    .await;

    let rule = controller.fetch_rule("b").await.unwrap();
    assert_eq!(rule.description, "second");

    let err = controller.fetch_rule("zzz").await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { identifier } if identifier == "zzz"));
}

// ── Interfaces ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_interfaces_from_interface_list() {
    let (server, controller) = setup().await;

    mount_get(
        &server,
        "firewall/filter/getInterfaceList",
        json!({"interfaces": {"label": "Interfaces", "items": [
            {"value": "lan", "label": "LAN"},
            {"value": "opt3", "label": "DMZ"}
        ]}}),
    )
    .await;

    let interfaces = controller.fetch_available_interfaces().await;

    assert_eq!(
        interfaces.iter().collect::<Vec<_>>(),
        vec![
            (&"lan".to_string(), &"LAN".to_string()),
            (&"opt3".to_string(), &"DMZ".to_string())
        ]
    );
}

#[tokio::test]
async fn test_interfaces_fall_back_to_names_map() {
    let (server, controller) = setup().await;

    mount_get(
        &server,
        "diagnostics/interface/getInterfaceNames",
        json!({"igb0": "WAN", "igb1": "LAN"}),
    )
    .await;

    let interfaces = controller.fetch_available_interfaces().await;

    assert_eq!(interfaces.len(), 2);
    assert_eq!(interfaces["igb1"], "LAN");
}

#[tokio::test]
async fn test_interfaces_from_rule_template_options() {
    let (server, controller) = setup().await;

    mount_get(&server, "firewall/filter/getInterfaceList", json!({"interfaces": {}})).await;
    mount_get(
        &server,
        "firewall/filter/getRule",
        json!({"rule": {"interface": {
            "lan": {"value": "LAN", "selected": 0},
            "wg0": {"value": "WireGuard", "selected": 0}
        }}}),
    )
    .await;

    let interfaces = controller.fetch_available_interfaces().await;

    assert_eq!(interfaces["wg0"], "WireGuard");
    assert_eq!(interfaces.len(), 2);
}

#[tokio::test]
async fn test_interfaces_total_failure_uses_builtin_table() {
    let (_server, controller) = setup().await;

    let interfaces = controller.fetch_available_interfaces().await;

    assert_eq!(
        interfaces.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["lan", "wan", "opt1", "lo0"]
    );
    assert_eq!(interfaces["wan"], "WAN");
}

// ── Rule writes ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_submit_create_posts_serialized_payload() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/firewall/filter/addRule"))
        .and(body_json(json!({"rule": {
            "type": "pass",
            "interface": "lan",
            "protocol": "TCP",
            "source": "any",
            "destination": "10.0.0.5",
            "destination_port": "22",
            "description": "",
            "enabled": "1",
            "sequence": "0"
        }})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": "saved", "uuid": "new-1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let edit = RuleEditRequest {
        protocol: "tcp".into(),
        destination: "10.0.0.5".into(),
        source_port: Some("any".into()),
        destination_port: Some("22".into()),
        description: Some("null".into()),
        ..RuleEditRequest::create("lan")
    };

    let id = controller.submit_rule_edit(&edit).await.unwrap();
    assert_eq!(id, "new-1");
}

#[tokio::test]
async fn test_submit_update_targets_existing_rule() {
    let (server, controller) = setup().await;

    mount_post(&server, "firewall/filter/setRule/u1", 200, json!({"result": "saved"})).await;

    let edit = RuleEditRequest::from_rule(&user_rule("u1")).unwrap();
    let id = controller.submit_rule_edit(&edit).await.unwrap();

    assert_eq!(id, "u1");
}

#[tokio::test]
async fn test_submit_validation_failure_joins_messages() {
    let (server, controller) = setup().await;

    mount_post(
        &server,
        "firewall/filter/addRule",
        200,
        json!({"result": "failed", "validations": {
            "rule.destination_port": "Please specify a valid port.",
            "rule.interface": "Unknown interface."
        }}),
    )
    .await;

    let err = controller
        .submit_rule_edit(&RuleEditRequest::create("nope"))
        .await
        .unwrap_err();

    match err {
        CoreError::ValidationFailed { message } => assert_eq!(
            message,
            "rule.destination_port: Please specify a valid port.; rule.interface: Unknown interface."
        ),
        other => panic!("expected ValidationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_submit_maps_http_statuses() {
    let (server, controller) = setup().await;

    mount_post(&server, "firewall/filter/setRule/gone", 404, json!({})).await;
    mount_post(
        &server,
        "firewall/filter/setRule/locked",
        401,
        json!({"errorMessage": "Authentication Failed"}),
    )
    .await;
    mount_post(
        &server,
        "firewall/filter/setRule/broken",
        500,
        json!({"errorMessage": "Internal Error"}),
    )
    .await;

    let edit_for = |id: &str| RuleEditRequest::from_rule(&user_rule(id)).unwrap();

    let err = controller.submit_rule_edit(&edit_for("gone")).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { identifier } if identifier == "gone"));

    let err = controller.submit_rule_edit(&edit_for("locked")).await.unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized { .. }));

    let err = controller.submit_rule_edit(&edit_for("broken")).await.unwrap_err();
    assert!(
        matches!(err, CoreError::ServerError { status: 500, ref message } if message == "Internal Error"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_read_only_rules_are_never_sent() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "deleted"})))
        .expect(0)
        .mount(&server)
        .await;

    let rule = Rule {
        origin: "anti-lockout".into(),
        ..user_rule("lockout")
    };

    let err = controller.delete_rule(&rule).await.unwrap_err();
    assert!(matches!(err, CoreError::ReadOnlyRule { .. }));

    let err = controller.toggle_rule(&rule).await.unwrap_err();
    assert!(matches!(err, CoreError::ReadOnlyRule { .. }));

    let err = RuleEditRequest::from_rule(&rule).unwrap_err();
    assert!(matches!(err, CoreError::ReadOnlyRule { .. }));
}

#[tokio::test]
async fn test_toggle_delete_and_apply() {
    let (server, controller) = setup().await;

    mount_post(
        &server,
        "firewall/filter/toggleRule/u1",
        200,
        json!({"result": "Disabled", "changed": true}),
    )
    .await;
    mount_post(&server, "firewall/filter/delRule/u1", 200, json!({"result": "deleted"})).await;
    mount_post(&server, "firewall/filter/apply", 200, json!({"status": "ok"})).await;

    let rule = user_rule("u1");
    controller.toggle_rule(&rule).await.unwrap();
    controller.delete_rule(&rule).await.unwrap();
    controller.apply_changes().await.unwrap();
}

#[tokio::test]
async fn test_delete_missing_rule_is_not_found() {
    let (server, controller) = setup().await;

    mount_post(&server, "firewall/filter/delRule/u9", 200, json!({"result": "not found"})).await;

    let err = controller.delete_rule(&user_rule("u9")).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { identifier } if identifier == "u9"));
}

#[tokio::test]
async fn test_apply_failure_status_is_rejected() {
    let (server, controller) = setup().await;

    mount_post(&server, "firewall/filter/apply", 200, json!({"status": "failed"})).await;

    let err = controller.apply_changes().await.unwrap_err();
    assert!(matches!(err, CoreError::Rejected { .. }));
}

// ── Construction ────────────────────────────────────────────────────

#[tokio::test]
async fn test_controller_from_config_sends_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/firewall/filter/searchRule"))
        .and(wiremock::matchers::basic_auth("api-key", "api-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": [{"uuid": "a"}]})))
        .mount(&server)
        .await;

    let config = ControllerConfig {
        url: Url::parse(&server.uri()).unwrap(),
        api_key: "api-key".into(),
        api_secret: "api-secret".to_string().into(),
        tls: TlsVerification::DangerAcceptInvalid,
        timeout: Duration::from_secs(5),
    };
    let controller = Controller::new(config).unwrap();

    let rules = controller.fetch_rules().await;
    assert_eq!(rules.len(), 1);
}

#[tokio::test]
async fn test_write_to_unreachable_appliance_is_transport_error() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let base_url = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();
    let credentials = Credentials::new("key", "secret".to_string().into());
    let client = OpnsenseClient::with_client(reqwest::Client::new(), base_url, credentials);
    let controller = Controller::with_client(client);

    let result = controller.apply_changes().await;

    assert!(
        matches!(result, Err(CoreError::Transport { .. })),
        "expected Transport error, got: {result:?}"
    );
}
