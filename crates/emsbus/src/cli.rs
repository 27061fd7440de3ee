//! Clap derive structures for the `emsbus` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// emsbus -- EMS bus status dashboard for the terminal
#[derive(Debug, Parser)]
#[command(
    name = "emsbus",
    version,
    about = "Monitor an EMS bus gateway from the command line",
    long_about = "Shows bus connectivity, uptime, active devices and sensors, and \
        per-device telegram quality for an EMS bus gateway.\n\n\
        `watch` keeps the view live, refreshing on a fixed interval; \
        `scan` asks the gateway to discover new devices (admin only).",
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
    /// Gateway profile to use
    #[arg(long, short = 'p', env = "EMSBUS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Gateway URL or host (overrides profile)
    #[arg(long, short = 'g', env = "EMSBUS_GATEWAY", global = true)]
    pub gateway: Option<String>,

    /// Access token (overrides profile, keyring, and token_env)
    #[arg(long, env = "EMSBUS_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "EMSBUS_OUTPUT",
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
    #[arg(long, short = 'k', env = "EMSBUS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "EMSBUS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Refresh interval in seconds for `watch`
    #[arg(
        long,
        short = 'n',
        env = "EMSBUS_INTERVAL",
        global = true,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: Option<u64>,
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
    /// Plain text, tab-separated (scripting)
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
    /// Show bus status once
    #[command(alias = "st")]
    Status,

    /// Show bus status and keep refreshing (Enter refreshes now, Ctrl-C quits)
    #[command(alias = "w")]
    Watch,

    /// Scan the bus for new devices (requires an admin token)
    Scan,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
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
    /// Create or extend the config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
