//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use opnly_core::Controller;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Reload the filter when `--apply` was given, otherwise remind the user.
pub async fn apply_if_requested(
    controller: &Controller,
    apply: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if apply {
        controller.apply_changes().await?;
        if !global.quiet {
            eprintln!("✓ Filter configuration applied");
        }
    } else if !global.quiet {
        eprintln!("  Saved. Run `opnly rules apply` to activate.");
    }
    Ok(())
}
