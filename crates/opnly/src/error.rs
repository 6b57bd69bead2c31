//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable process exit code.

use miette::Diagnostic;
use thiserror::Error;

use opnly_config::ConfigError;
use opnly_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the appliance: {reason}")]
    #[diagnostic(
        code(opnly::connection_failed),
        help(
            "Check that the appliance is reachable and the URL is right.\n\
             Self-signed certificate? Try: opnly status --insecure"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("System resource information is unavailable")]
    #[diagnostic(
        code(opnly::status_unavailable),
        help(
            "None of the known resource endpoints answered.\n\
             Run with -vv to see each attempt."
        )
    )]
    StatusUnavailable,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(opnly::auth_failed),
        help(
            "Verify the API key and secret under System > Access > Users.\n\
             Run: opnly config set-secret"
        )
    )]
    AuthFailed { message: String },

    #[error("No API {part} configured for profile '{profile}'")]
    #[diagnostic(
        code(opnly::no_credentials),
        help(
            "Configure credentials with: opnly config init\n\
             Or set OPNLY_API_KEY and OPNLY_API_SECRET."
        )
    )]
    NoCredentials { profile: String, part: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(opnly::not_found),
        help("Run: opnly {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Rule '{identifier}' is managed by the appliance")]
    #[diagnostic(
        code(opnly::read_only),
        help("Automatically generated rules can only be changed on the appliance itself.")
    )]
    ReadOnlyRule { identifier: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(opnly::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(opnly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(opnly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: opnly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(opnly::no_config),
        help(
            "Create one with: opnly config init\n\
             Expected at: {path}\n\
             Or pass --controller, --api-key and --api-secret."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(opnly::config))]
    Config { message: String },

    #[error("Keyring error: {reason}")]
    #[diagnostic(
        code(opnly::keyring),
        help("Store the secret in the config file or OPNLY_API_SECRET instead.")
    )]
    Keyring { reason: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(opnly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render JSON: {0}")]
    #[diagnostic(code(opnly::json))]
    Json(#[from] serde_json::Error),

    #[error("Could not render YAML: {0}")]
    #[diagnostic(code(opnly::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::StatusUnavailable => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ReadOnlyRule { .. } => exit_code::PERMISSION,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MandatorySourceUnavailable => CliError::StatusUnavailable,

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "rule".into(),
                reason: message,
            },

            CoreError::NotFound { identifier } => CliError::NotFound {
                resource_type: "rule".into(),
                identifier,
                list_command: "rules list".into(),
            },

            CoreError::Unauthorized { message } => CliError::AuthFailed { message },

            CoreError::ServerError { status, message } => CliError::ApiError {
                code: format!("HTTP {status}"),
                message,
            },

            CoreError::ReadOnlyRule { identifier } => CliError::ReadOnlyRule { identifier },

            CoreError::Rejected { message } => CliError::ApiError {
                code: "rejected".into(),
                message,
            },

            CoreError::Transport { reason } => CliError::ConnectionFailed { reason },

            CoreError::Config { message } => CliError::Config { message },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: "(none)".into(),
            },
            ConfigError::NoCredentials { profile, part } => CliError::NoCredentials {
                profile,
                part: part.into(),
            },
            ConfigError::Keyring(e) => CliError::Keyring {
                reason: e.to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
