// ── Core error types ──
//
// User-facing errors from opnly-core. Read paths absorb almost every
// transport failure into defaulted fields; what reaches the caller here is
// either the one mandatory read source failing or a rejected write.
// The `From<opnly_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Read path ────────────────────────────────────────────────────
    /// Every endpoint for the resource-usage query failed.
    #[error("System resource information is unavailable from every known endpoint")]
    MandatorySourceUnavailable,

    // ── Write path ───────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Not found: {identifier}")]
    NotFound { identifier: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Rule {identifier} is managed by the appliance and cannot be modified")]
    ReadOnlyRule { identifier: String },

    #[error("Operation rejected by appliance: {message}")]
    Rejected { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach appliance: {reason}")]
    Transport { reason: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<opnly_api::Error> for CoreError {
    fn from(err: opnly_api::Error) -> Self {
        match err {
            opnly_api::Error::Authentication { message } => CoreError::Unauthorized { message },
            opnly_api::Error::Api { status, message } => match status {
                401 | 403 => CoreError::Unauthorized { message },
                404 => CoreError::NotFound {
                    identifier: message,
                },
                500.. => CoreError::ServerError { status, message },
                _ => CoreError::Rejected {
                    message: format!("HTTP {status}: {message}"),
                },
            },
            opnly_api::Error::Transport(e) => CoreError::Transport {
                reason: e.to_string(),
            },
            opnly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            opnly_api::Error::Tls(msg) => CoreError::Transport {
                reason: format!("TLS error: {msg}"),
            },
            opnly_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
