//! CLI configuration: thin wrapper around `opnly_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--controller, --api-key, --api-secret, --insecure, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use opnly_core::{ControllerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use opnly_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Comma-separated profile names for diagnostics.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Build a `ControllerConfig` from the config file, profile, and CLI overrides.
///
/// Without a matching profile, `--controller`, `--api-key` and
/// `--api-secret` (or their env vars) must all be present.
pub fn build_controller_config(
    global: &GlobalOpts,
    config: &Config,
) -> Result<ControllerConfig, CliError> {
    let profile_name = active_profile_name(global, config);

    if let Some(profile) = config.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &config.defaults, global);
    }

    // An explicitly requested profile that doesn't exist is an error, not
    // a cue to fall back to flags.
    if global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(config),
        });
    }

    let url_str = global.controller.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let url = parse_url(url_str)?;

    let api_key = global.api_key.clone().ok_or_else(|| CliError::NoCredentials {
        profile: profile_name.clone(),
        part: "key".into(),
    })?;
    let api_secret = global
        .api_secret
        .clone()
        .map(SecretString::from)
        .ok_or_else(|| CliError::NoCredentials {
            profile: profile_name,
            part: "secret".into(),
        })?;

    let tls = if global.insecure || config.defaults.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(ControllerConfig {
        url,
        api_key,
        api_secret,
        tls,
        timeout: Duration::from_secs(global.timeout.unwrap_or(config.defaults.timeout)),
    })
}

/// Translate a `Profile` + global flags into a `ControllerConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ControllerConfig, CliError> {
    // 1. Appliance URL (flag > env > profile)
    let url = parse_url(global.controller.as_deref().unwrap_or(&profile.controller))?;

    // 2. Credentials (flag > shared resolution chain)
    let api_key = match global.api_key {
        Some(ref key) => key.clone(),
        None => opnly_config::resolve_api_key(profile, profile_name)?,
    };
    let api_secret = match global.api_secret {
        Some(ref secret) => SecretString::from(secret.clone()),
        None => opnly_config::resolve_api_secret(profile, profile_name)?,
    };

    // 3. TLS verification
    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        opnly_config::tls_for(profile, defaults)
    };

    // 4. Timeout
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(defaults.timeout);

    Ok(ControllerConfig {
        url,
        api_key,
        api_secret,
        tls,
        timeout: Duration::from_secs(timeout),
    })
}

fn parse_url(url_str: &str) -> Result<url::Url, CliError> {
    url_str.parse().map_err(|_| CliError::Validation {
        field: "controller".into(),
        reason: format!("invalid URL: {url_str}"),
    })
}
