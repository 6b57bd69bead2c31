//! Clap derive structures for the `opnly` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// opnly -- command-line client for OPNsense firewalls
#[derive(Debug, Parser)]
#[command(
    name = "opnly",
    version,
    about = "Inspect and edit OPNsense firewalls from the command line",
    long_about = "A CLI for OPNsense appliances.\n\n\
        Reads system status and filter rules through whichever API endpoint\n\
        the firmware answers, and writes rule edits back in the wire format\n\
        the appliance expects.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Appliance profile to use
    #[arg(long, short = 'p', env = "OPNLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Appliance URL (overrides profile)
    #[arg(long, short = 'c', env = "OPNLY_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// API key
    #[arg(long, env = "OPNLY_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// API secret
    #[arg(long, env = "OPNLY_API_SECRET", global = true, hide_env = true)]
    pub api_secret: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "OPNLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "OPNLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "OPNLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show system identity, uptime and resource usage
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Manage firewall filter rules
    #[command(alias = "r")]
    Rules(RulesArgs),

    /// List interfaces a rule can be attached to
    #[command(alias = "if")]
    Interfaces,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STATUS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Also show which endpoint answered each source
    #[arg(long)]
    pub sources: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RULES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// List filter rules in evaluation order
    #[command(alias = "ls")]
    List {
        /// Only show rules on this interface
        #[arg(long, short = 'i')]
        interface: Option<String>,
    },

    /// Show one rule
    Get {
        /// Rule UUID
        id: String,
    },

    /// Create a rule
    Create(CreateRuleArgs),

    /// Update fields of an existing rule
    Update(UpdateRuleArgs),

    /// Delete a rule
    #[command(alias = "rm")]
    Delete {
        /// Rule UUID
        id: String,

        /// Apply the filter configuration afterwards
        #[arg(long)]
        apply: bool,
    },

    /// Flip a rule between enabled and disabled
    Toggle {
        /// Rule UUID
        id: String,

        /// Apply the filter configuration afterwards
        #[arg(long)]
        apply: bool,
    },

    /// Reload the filter so saved edits take effect
    Apply,
}

#[derive(Debug, Args)]
pub struct CreateRuleArgs {
    /// Interface the rule attaches to (e.g. lan, wan, opt1)
    #[arg(long, short = 'i', required_unless_present = "from_file")]
    pub interface: Option<String>,

    /// Read the whole rule from a JSON file; flags override its fields
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,

    #[command(flatten)]
    pub fields: RuleFieldArgs,
}

#[derive(Debug, Args)]
pub struct UpdateRuleArgs {
    /// Rule UUID
    pub id: String,

    /// Move the rule to another interface
    #[arg(long, short = 'i')]
    pub interface: Option<String>,

    #[command(flatten)]
    pub fields: RuleFieldArgs,
}

/// Rule fields shared by `create` and `update`. Unset flags leave the
/// current (or default) value alone.
#[derive(Debug, Args)]
pub struct RuleFieldArgs {
    /// What to do with matching traffic
    #[arg(long, short = 'a')]
    pub action: Option<RuleActionArg>,

    /// Protocol (any, tcp, udp, tcp/udp, icmp, ...)
    #[arg(long)]
    pub protocol: Option<String>,

    /// Source network, alias or "any"
    #[arg(long, short = 's')]
    pub source: Option<String>,

    /// Destination network, alias or "any"
    #[arg(long, short = 'd')]
    pub destination: Option<String>,

    /// Source port or range (tcp/udp only)
    #[arg(long)]
    pub source_port: Option<String>,

    /// Destination port or range (tcp/udp only)
    #[arg(long)]
    pub destination_port: Option<String>,

    /// Free-text description
    #[arg(long)]
    pub description: Option<String>,

    /// Evaluation order
    #[arg(long)]
    pub sequence: Option<i64>,

    /// Enable the rule
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable the rule
    #[arg(long)]
    pub disable: bool,

    /// Apply the filter configuration afterwards
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RuleActionArg {
    Pass,
    Block,
    Reject,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Store the API secret in the system keyring
    SetSecret {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
