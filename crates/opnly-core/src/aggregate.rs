// ── Snapshot aggregation ──
//
// No single endpoint returns a full system picture. Four independent
// sources are resolved concurrently, each through its own fallback chain,
// then merged into one `Snapshot`:
//
//   (a) resources  memory counters              mandatory
//   (b) identity   hostname, firmware, product  optional
//   (c) activity   `top` header lines           optional
//   (d) disk       device/mountpoint table      optional

use serde_json::{Map, Value};
use tracing::{debug, warn};

use opnly_api::OpnsenseClient;

use crate::error::CoreError;
use crate::fallback::{EndpointAttempt, Resolution, json_object, resolve};
use crate::model::{Snapshot, SnapshotReport, SnapshotSources};
use crate::parse::{coerce_u64, cpu_usage_from_headers, parse_storage_size, uptime_from_headers};

const ROOT_MOUNTPOINT: &str = "/";

// ── Fallback chains ──────────────────────────────────────────────────

fn resources_chain() -> Vec<EndpointAttempt<Value>> {
    vec![
        EndpointAttempt::new("diagnostics/system/systemResources", json_object),
        EndpointAttempt::new("diagnostics/system/system_resources", json_object),
    ]
}

fn identity_chain() -> Vec<EndpointAttempt<Value>> {
    vec![
        EndpointAttempt::new("core/firmware/status", json_object),
        EndpointAttempt::new("core/firmware/info", json_object),
        EndpointAttempt::new("diagnostics/system/systemInformation", json_object),
    ]
}

fn activity_chain() -> Vec<EndpointAttempt<Value>> {
    vec![
        EndpointAttempt::new("diagnostics/activity/getActivity", json_object),
        EndpointAttempt::new("diagnostics/activity/get_activity", json_object),
    ]
}

fn disk_chain() -> Vec<EndpointAttempt<Value>> {
    vec![
        EndpointAttempt::new("diagnostics/system/systemDisk", json_object),
        EndpointAttempt::new("diagnostics/system/system_disk", json_object),
    ]
}

fn empty_mapping() -> Value {
    Value::Object(Map::new())
}

// ── Public entry points ──────────────────────────────────────────────

/// Assemble a fresh snapshot.
///
/// Fails only when every resource-usage endpoint fails; the other three
/// sources fall back to zero/empty fields.
pub async fn fetch_snapshot(client: &OpnsenseClient) -> Result<Snapshot, CoreError> {
    fetch_snapshot_report(client).await.map(|report| report.snapshot)
}

/// Like [`fetch_snapshot`], also reporting which endpoint answered each source.
pub async fn fetch_snapshot_report(client: &OpnsenseClient) -> Result<SnapshotReport, CoreError> {
    let (resources_chain, identity_chain, activity_chain, disk_chain) =
        (resources_chain(), identity_chain(), activity_chain(), disk_chain());

    let (resources, identity, activity, disk) = tokio::join!(
        resolve(client, &resources_chain, empty_mapping()),
        resolve(client, &identity_chain, empty_mapping()),
        resolve(client, &activity_chain, empty_mapping()),
        resolve(client, &disk_chain, empty_mapping()),
    );

    if !resources.succeeded() {
        warn!(
            attempts = resources.failures.len(),
            "no resource-usage endpoint answered"
        );
        return Err(CoreError::MandatorySourceUnavailable);
    }

    for (name, resolution) in [
        ("identity", &identity),
        ("activity", &activity),
        ("disk", &disk),
    ] {
        warn_if_degraded(name, resolution);
    }

    let sources = SnapshotSources {
        resources: resources.answered_by,
        identity: identity.answered_by,
        activity: activity.answered_by,
        disk: disk.answered_by,
    };
    let snapshot = merge_snapshot(&resources.value, &identity.value, &activity.value, &disk.value);
    debug!(hostname = %snapshot.hostname, ?sources, "snapshot assembled");

    Ok(SnapshotReport { snapshot, sources })
}

fn warn_if_degraded(source: &str, resolution: &Resolution<Value>) {
    if resolution.succeeded() {
        return;
    }
    let last_reason = resolution
        .failures
        .last()
        .map_or("no attempts", |f| f.reason.as_str());
    warn!(source, last_reason, "snapshot source unavailable, using defaults");
}

// ── Merge ────────────────────────────────────────────────────────────

/// Merge the four source bodies. Missing sources are passed as `{}`.
pub(crate) fn merge_snapshot(
    resources: &Value,
    identity: &Value,
    activity: &Value,
    disk: &Value,
) -> Snapshot {
    let headers = header_lines(activity);
    let (disk_used_bytes, disk_total_bytes) = root_disk_usage(disk);

    Snapshot {
        hostname: first_non_empty([text(identity, "hostname"), text(identity, "name")]),
        product_type: product_field(identity, "product_name"),
        version: product_field(identity, "product_version"),
        architecture: product_field(identity, "product_arch"),
        commit_hash: product_field(identity, "product_hash"),
        mirror_url: product_field(identity, "product_mirror"),
        repository_label: product_field(identity, "product_repos"),
        last_update: last_update(identity),
        platform_label: first_non_empty([
            text(identity, "os_version"),
            identity
                .get("product")
                .map(|p| text(p, "product_abi"))
                .unwrap_or_default(),
        ]),
        uptime_secs: uptime_from_headers(&headers),
        cpu_usage_pct: cpu_usage_from_headers(&headers),
        memory_used_bytes: memory_counter(resources, "used"),
        memory_total_bytes: memory_counter(resources, "total"),
        disk_used_bytes,
        disk_total_bytes,
    }
}

/// Read from the nested `product` object, or the top level when it is absent.
fn product_field(identity: &Value, name: &str) -> String {
    match identity.get("product") {
        Some(product) if product.is_object() => text(product, name),
        _ => text(identity, name),
    }
}

fn last_update(identity: &Value) -> String {
    first_non_empty([
        identity
            .get("product")
            .map(|p| text(p, "product_time"))
            .unwrap_or_default(),
        text(identity, "product_time"),
        text(identity, "status_msg"),
        text(identity, "last_check"),
    ])
}

fn memory_counter(resources: &Value, name: &str) -> u64 {
    resources
        .get("memory")
        .and_then(|memory| memory.get(name))
        .map_or(0, coerce_u64)
}

fn header_lines(activity: &Value) -> Vec<String> {
    activity
        .get("headers")
        .and_then(Value::as_array)
        .map(|lines| {
            lines
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// `(used, total)` bytes of the device mounted at `/`, or zeros.
fn root_disk_usage(disk: &Value) -> (u64, u64) {
    let Some(root) = disk
        .get("devices")
        .and_then(Value::as_array)
        .and_then(|devices| {
            devices
                .iter()
                .find(|d| d.get("mountpoint").and_then(Value::as_str) == Some(ROOT_MOUNTPOINT))
        })
    else {
        return (0, 0);
    };

    let used = parse_storage_size(&text(root, "used"));
    let total = parse_storage_size(&first_non_empty([text(root, "blocks"), text(root, "size")]));
    (used, total)
}

fn text(raw: &Value, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn first_non_empty<const N: usize>(candidates: [String; N]) -> String {
    candidates
        .into_iter()
        .find(|s| !s.trim().is_empty())
        .unwrap_or_default()
}
