//! `opnly interfaces`: interfaces a rule can be attached to.

use serde::Serialize;
use tabled::Tabled;

use opnly_core::Controller;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Serialize, Tabled)]
struct InterfaceEntry {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
}

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let entries: Vec<InterfaceEntry> = controller
        .fetch_available_interfaces()
        .await
        .into_iter()
        .map(|(key, name)| InterfaceEntry { key, name })
        .collect();

    let out = output::render_list(
        &global.output,
        &entries,
        InterfaceEntry::clone,
        |e| e.key.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
