//! Clap derive structures for the `nsdp` CLI.
//!
//! Defines the command tree, global flags, and shared types. Kept free of
//! workspace dependencies so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nsdp -- declarative configuration for small managed switches
#[derive(Debug, Parser)]
#[command(
    name = "nsdp",
    version,
    about = "Declaratively configure NSDP-managed switches",
    long_about = "Reconciles a declared switch configuration (name, addressing, \
        VLAN membership, PVIDs) against the live device.\n\n\
        Devices are reached through a simulated backend persisted as JSON \
        (--device-file).",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "NSDP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Simulated device file backing the switches
    #[arg(long, short = 'd', env = "NSDP_DEVICE_FILE", global = true)]
    pub device_file: Option<PathBuf>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "NSDP_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Operation timeout in seconds [default: from config, else 30]
    #[arg(long, env = "NSDP_TIMEOUT", global = true)]
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
    /// Read a switch into the declared shape
    Read(ReadArgs),

    /// Show the writes an apply would issue, without writing
    Plan(DesiredArgs),

    /// Converge a switch to a declared configuration
    Apply(DesiredArgs),

    /// Stop tracking a switch (device configuration is left in place)
    Forget(ForgetArgs),

    /// Show identity and addressing of a switch
    Info(InfoArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Switch commands ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReadArgs {
    /// Switch MAC address
    pub mac: String,

    /// Port ids to include (comma separated)
    #[arg(long, short = 'p', value_delimiter = ',')]
    pub ports: Vec<u8>,
}

#[derive(Debug, Args)]
pub struct DesiredArgs {
    /// Declared configuration (TOML)
    pub file: PathBuf,

    /// State file holding the last applied configuration
    /// (defaults to <file>.state.json)
    #[arg(long, short = 's')]
    pub state: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ForgetArgs {
    /// State file of the switch to forget
    pub state: PathBuf,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Switch MAC address
    pub mac: String,
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
    /// Print the config file path
    Path,

    /// Display current resolved configuration
    Show,

    /// Store a switch password in the system keyring
    SetPassword {
        /// Switch MAC address
        mac: String,
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
