//! Firewall filter rule command handlers.

use indexmap::IndexMap;
use tabled::Tabled;

use opnly_core::{Controller, Rule, RuleAction, RuleEditRequest};

use crate::cli::{
    CreateRuleArgs, GlobalOpts, RuleActionArg, RuleFieldArgs, RulesArgs, RulesCommand,
    UpdateRuleArgs,
};
use crate::error::CliError;
use crate::output;

use super::util;

fn map_action(a: RuleActionArg) -> RuleAction {
    match a {
        RuleActionArg::Pass => RuleAction::Pass,
        RuleActionArg::Block => RuleAction::Block,
        RuleActionArg::Reject => RuleAction::Reject,
    }
}

fn or_any(value: &str) -> &str {
    if value.is_empty() { "any" } else { value }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Seq")]
    sequence: i64,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Proto")]
    protocol: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn endpoint(address: &str, port: &str, uses_ports: bool) -> String {
    if uses_ports && !port.is_empty() && !port.eq_ignore_ascii_case("any") {
        format!("{}:{port}", or_any(address))
    } else {
        or_any(address).to_owned()
    }
}

fn rule_row(rule: &Rule, color: bool) -> RuleRow {
    let uses_ports = rule.uses_ports();
    let mut description = rule.description.clone();
    if !rule.is_editable() {
        let marker = output::warn_text(&format!("[{}]", rule.origin), color);
        description = format!("{marker} {description}").trim_end().to_owned();
    }
    RuleRow {
        id: rule.id.clone(),
        sequence: rule.sequence,
        action: rule.action.to_string(),
        interface: rule.interface.clone(),
        protocol: or_any(&rule.protocol).to_owned(),
        source: endpoint(&rule.source, &rule.source_port, uses_ports),
        destination: endpoint(&rule.destination, &rule.destination_port, uses_ports),
        enabled: output::yes_no(rule.enabled, color),
        description,
    }
}

fn rule_detail(r: &Rule) -> String {
    let mut lines = vec![
        format!("ID:          {}", r.id),
        format!("Sequence:    {}", r.sequence),
        format!("Action:      {}", r.action),
        format!("Interface:   {}", r.interface),
        format!("Protocol:    {}", or_any(&r.protocol)),
        format!("Source:      {}", or_any(&r.source)),
        format!("Destination: {}", or_any(&r.destination)),
    ];
    if r.uses_ports() {
        lines.push(format!("Src port:    {}", or_any(&r.source_port)));
        lines.push(format!("Dst port:    {}", or_any(&r.destination_port)));
    }
    lines.push(format!("Enabled:     {}", r.enabled));
    lines.push(format!(
        "Description: {}",
        if r.description.is_empty() {
            "-"
        } else {
            &r.description
        }
    ));
    if !r.is_editable() {
        lines.push(format!("Origin:      {} (read-only)", r.origin));
    }
    lines.join("\n")
}

// ── Request building ────────────────────────────────────────────────

/// Overlay the flags that were given onto `req`.
fn apply_fields(req: &mut RuleEditRequest, fields: &RuleFieldArgs) {
    if let Some(action) = fields.action {
        req.action = map_action(action);
    }
    if let Some(ref protocol) = fields.protocol {
        req.protocol.clone_from(protocol);
    }
    if let Some(ref source) = fields.source {
        req.source.clone_from(source);
    }
    if let Some(ref destination) = fields.destination {
        req.destination.clone_from(destination);
    }
    if fields.source_port.is_some() {
        req.source_port.clone_from(&fields.source_port);
    }
    if fields.destination_port.is_some() {
        req.destination_port.clone_from(&fields.destination_port);
    }
    if fields.description.is_some() {
        req.description.clone_from(&fields.description);
    }
    if let Some(sequence) = fields.sequence {
        req.sequence = sequence;
    }
    if fields.enable {
        req.enabled = true;
    }
    if fields.disable {
        req.enabled = false;
    }
}

fn create_request(args: &CreateRuleArgs) -> Result<RuleEditRequest, CliError> {
    let mut req = match args.from_file {
        Some(ref path) => {
            let mut req: RuleEditRequest = serde_json::from_value(util::read_json_file(path)?)
                .map_err(|e| CliError::Validation {
                    field: "from-file".into(),
                    reason: e.to_string(),
                })?;
            req.uuid = None;
            req
        }
        None => RuleEditRequest::create(args.interface.clone().unwrap_or_default()),
    };
    if let Some(ref interface) = args.interface {
        req.interface.clone_from(interface);
    }
    apply_fields(&mut req, &args.fields);

    if req.interface.trim().is_empty() {
        return Err(CliError::Validation {
            field: "interface".into(),
            reason: "a rule needs an interface (see `opnly interfaces`)".into(),
        });
    }
    Ok(req)
}

fn update_request(rule: &Rule, args: &UpdateRuleArgs) -> Result<RuleEditRequest, CliError> {
    let mut req = RuleEditRequest::from_rule(rule)?;
    if let Some(ref interface) = args.interface {
        req.interface.clone_from(interface);
    }
    apply_fields(&mut req, &args.fields);
    Ok(req)
}

/// The interface key for `value`, which may be a key or a display label.
///
/// Rules read back carry the label; writes need the key.
fn interface_key(interfaces: &IndexMap<String, String>, value: &str) -> String {
    if interfaces.contains_key(value) {
        return value.to_owned();
    }
    interfaces
        .iter()
        .find(|(_, label)| label.eq_ignore_ascii_case(value))
        .map_or_else(|| value.to_owned(), |(key, _)| key.clone())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: RulesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RulesCommand::List { interface } => {
            let mut rules = controller.fetch_rules().await;
            if let Some(ref wanted) = interface {
                rules.retain(|r| r.interface.eq_ignore_ascii_case(wanted));
            }
            rules.sort_by_key(|r| r.sequence);

            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &rules,
                |r| rule_row(r, color),
                |r| r.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RulesCommand::Get { id } => {
            let rule = controller.fetch_rule(&id).await?;
            let out = output::render_single(&global.output, &rule, rule_detail, |r| r.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RulesCommand::Create(args) => {
            let req = create_request(&args)?;
            let uuid = controller.submit_rule_edit(&req).await?;
            if !global.quiet {
                eprintln!("✓ Rule created");
            }
            output::print_output(&uuid, global.quiet);
            util::apply_if_requested(controller, args.fields.apply, global).await
        }

        RulesCommand::Update(args) => {
            let rule = controller.fetch_rule(&args.id).await?;
            let mut req = update_request(&rule, &args)?;
            if args.interface.is_none() {
                let interfaces = controller.fetch_available_interfaces().await;
                req.interface = interface_key(&interfaces, &req.interface);
            }
            controller.submit_rule_edit(&req).await?;
            if !global.quiet {
                eprintln!("✓ Rule {} updated", rule.id);
            }
            util::apply_if_requested(controller, args.fields.apply, global).await
        }

        RulesCommand::Delete { id, apply } => {
            let rule = controller.fetch_rule(&id).await?;
            let prompt = format!(
                "Delete rule {id} ({})?",
                if rule.description.is_empty() {
                    "no description"
                } else {
                    &rule.description
                }
            );
            if !util::confirm(&prompt, "rules delete", global.yes)? {
                return Ok(());
            }
            controller.delete_rule(&rule).await?;
            if !global.quiet {
                eprintln!("✓ Rule {id} deleted");
            }
            util::apply_if_requested(controller, apply, global).await
        }

        RulesCommand::Toggle { id, apply } => {
            let rule = controller.fetch_rule(&id).await?;
            controller.toggle_rule(&rule).await?;
            if !global.quiet {
                let state = if rule.enabled { "disabled" } else { "enabled" };
                eprintln!("✓ Rule {id} {state}");
            }
            util::apply_if_requested(controller, apply, global).await
        }

        RulesCommand::Apply => {
            controller.apply_changes().await?;
            if !global.quiet {
                eprintln!("✓ Filter configuration applied");
            }
            Ok(())
        }
    }
}
