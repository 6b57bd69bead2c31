// ── Domain model ──
//
// Canonical entities every consumer sees, independent of which endpoint
// or firmware produced them.

pub mod rule;
pub mod snapshot;

pub use rule::{Rule, RuleAction};
pub use snapshot::{Snapshot, SnapshotReport, SnapshotSources};
