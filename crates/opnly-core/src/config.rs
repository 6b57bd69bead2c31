// ── Runtime connection configuration ──
//
// These types describe *how* to reach an appliance. They carry credential
// data and connection tuning, but never touch disk. The CLI constructs a
// `ControllerConfig` (usually via opnly-config) and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs). Default for local appliances.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for talking to a single appliance.
///
/// Built by the CLI, passed to `Controller` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Appliance URL (e.g., `https://192.168.1.1`).
    pub url: Url,
    /// API key (the public half of the pair).
    pub api_key: String,
    /// API secret.
    pub api_secret: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}
