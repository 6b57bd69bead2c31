// ── System snapshot ──

use serde::{Deserialize, Serialize};

/// Canonical system and resource state.
///
/// Every field has a zero/empty default so consumers never branch on
/// presence; a field that could not be fetched reads the same as one the
/// appliance left blank. [`SnapshotSources`] says which is which.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub hostname: String,
    pub product_type: String,
    pub version: String,
    pub architecture: String,
    pub commit_hash: String,
    pub mirror_url: String,
    pub repository_label: String,
    pub last_update: String,
    pub platform_label: String,
    pub uptime_secs: u64,
    pub cpu_usage_pct: f64,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
    pub disk_used_bytes: u64,
    pub disk_total_bytes: u64,
}

/// Endpoint that answered each of the four snapshot queries, `None` when
/// its fallback chain was exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSources {
    pub resources: Option<String>,
    pub identity: Option<String>,
    pub activity: Option<String>,
    pub disk: Option<String>,
}

impl SnapshotSources {
    /// Names of the optional sources that fell back to defaults.
    pub fn degraded(&self) -> Vec<&'static str> {
        [
            ("identity", &self.identity),
            ("activity", &self.activity),
            ("disk", &self.disk),
        ]
        .into_iter()
        .filter(|(_, source)| source.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

/// A snapshot together with where each part of it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotReport {
    pub snapshot: Snapshot,
    pub sources: SnapshotSources,
}
