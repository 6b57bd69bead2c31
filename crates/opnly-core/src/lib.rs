//! Normalization and aggregation engine between `opnly-api` and its consumers.
//!
//! OPNsense reports the same logical field in different shapes depending on
//! endpoint and firmware. This crate turns those responses into a small set
//! of stable types, and turns edits back into the shape the appliance wants:
//!
//! - **[`Controller`]**: the facade. Reads ([`fetch_snapshot`](Controller::fetch_snapshot),
//!   [`fetch_rules`](Controller::fetch_rules),
//!   [`fetch_available_interfaces`](Controller::fetch_available_interfaces))
//!   are fetched fresh on every call; writes
//!   ([`submit_rule_edit`](Controller::submit_rule_edit) and friends) surface
//!   every failure.
//!
//! - **Fallback resolution** ([`fallback`]): ordered `(endpoint, adapter)`
//!   chains walked until one answers in a recognizable shape.
//!
//! - **Shape normalization**: [`selection`] for scalar/list/option-map
//!   fields, [`parse`] for free-text quantities, [`normalize`] for filter
//!   rules, [`aggregate`] for the four-source system snapshot.
//!
//! - **Write serialization** ([`serialize`]): protocol-aware outbound payloads.

pub mod aggregate;
pub mod config;
pub mod controller;
pub mod error;
pub mod fallback;
pub mod model;
pub mod normalize;
pub mod parse;
pub mod requests;
pub mod selection;
pub mod serialize;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, TlsVerification};
pub use controller::Controller;
pub use error::CoreError;
pub use fallback::{AttemptFailure, EndpointAttempt, Resolution};
pub use model::{Rule, RuleAction, Snapshot, SnapshotReport, SnapshotSources};
pub use requests::RuleEditRequest;
pub use selection::{SelectionField, SelectionOption, resolve_selection};
pub use serialize::{payload_to_raw_rule, serialize_rule_edit};
