//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Password, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// A copy of `cfg` safe to print: key and plaintext secret masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some(MASK.into());
        }
        if profile.api_secret.is_some() {
            profile.api_secret = Some(MASK.into());
        }
    }
    cfg
}

/// Format an already redacted config for display.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "controller = \"{}\"", p.controller);
        if let Some(ref key) = p.api_key {
            let _ = writeln!(out, "api_key = \"{key}\"");
        }
        if let Some(ref secret) = p.api_secret {
            let _ = writeln!(out, "api_secret = \"{secret}\"");
        }
        if let Some(ref env) = p.api_secret_env {
            let _ = writeln!(out, "api_secret_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out.trim_end().to_owned()
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn profile_not_found(name: String, cfg: &Config) -> CliError {
    CliError::ProfileNotFound {
        name,
        available: config::available_profiles(cfg),
    }
}

/// Offer to store the secret in the system keyring.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored.
fn prompt_secret_storage(secret: String, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the API secret?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        opnly_config::store_api_secret(profile_name, &secret)?;
        eprintln!("   ✓ API secret stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let mut cfg = config::load_config_or_default();
            eprintln!("opnly configuration wizard");
            eprintln!("   Config path: {}\n", config::config_path().display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let controller: String = Input::new()
                .with_prompt("Appliance URL")
                .default("https://192.168.1.1".into())
                .interact_text()
                .map_err(prompt_err)?;
            if controller.parse::<url::Url>().is_err() {
                return Err(CliError::Validation {
                    field: "controller".into(),
                    reason: format!("invalid URL: {controller}"),
                });
            }

            let api_key: String = Input::new()
                .with_prompt("API key")
                .interact_text()
                .map_err(prompt_err)?;
            let api_secret = Password::new()
                .with_prompt("API secret")
                .interact()
                .map_err(prompt_err)?;
            if api_key.is_empty() || api_secret.is_empty() {
                return Err(CliError::Validation {
                    field: "credentials".into(),
                    reason: "API key and secret cannot be empty".into(),
                });
            }
            let api_secret = prompt_secret_storage(api_secret, &profile_name)?;

            let verify_tls = Confirm::new()
                .with_prompt("Verify the appliance's TLS certificate?")
                .default(false)
                .interact()
                .map_err(prompt_err)?;

            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    controller,
                    api_key: Some(api_key),
                    api_secret,
                    insecure: Some(!verify_tls),
                    ..Profile::default()
                },
            );
            cfg.default_profile = Some(profile_name.clone());

            let path = config::save_config(&cfg)?;
            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: opnly status");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── SetSecret ───────────────────────────────────────────────
        ConfigCommand::SetSecret { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(profile_name, &cfg));
            }

            let secret = Password::new()
                .with_prompt("API secret")
                .interact()
                .map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "secret".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            opnly_config::store_api_secret(&profile_name, &secret)?;

            eprintln!("✓ API secret stored in system keyring for profile '{profile_name}'");
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            cfg.profile(&name)
                .map_err(|_| profile_not_found(name.clone(), &cfg))?;

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }
    }
}
