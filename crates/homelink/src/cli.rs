//! Clap derive structures for the `homelink` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// homelink -- choose how to reach your self-hosted server
#[derive(Debug, Parser)]
#[command(
    name = "homelink",
    version,
    about = "Choose between the internal, remote relay, and external addresses of a self-hosted server",
    long_about = "Keeps track of up to three addresses for one server: an internal URL used on\n\
        trusted networks, a cloud relay URL, and an external URL. Resolves which one\n\
        is active right now, rewrites request URLs onto it, and fails over when it\n\
        stops answering.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "HOMELINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "HOMELINK_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Treat this as the current network identifier instead of probing ("" for none)
    #[arg(long, env = "HOMELINK_NETWORK", global = true, value_name = "SSID")]
    pub network: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HOMELINK_OUTPUT",
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

/// An endpoint name as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EndpointArg {
    /// Local-network address
    #[value(alias = "int", alias = "local")]
    Internal,
    /// Cloud relay address
    #[value(alias = "remote-ui", alias = "remote_ui", alias = "remote_relay", alias = "remote")]
    RemoteRelay,
    /// Public internet address
    #[value(alias = "ext")]
    External,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show every endpoint and which one is active
    #[command(alias = "st")]
    Status,

    /// Print the active base URL
    Url(UrlArgs),

    /// Webhook URL and registration details
    #[command(alias = "wh")]
    Webhook(WebhookArgs),

    /// Set or clear an endpoint address
    #[command(alias = "addr")]
    Address(AddressArgs),

    /// Turn the cloud relay preference on or off
    Cloud(CloudArgs),

    /// Manage the networks treated as internal
    #[command(alias = "net")]
    Networks(NetworksArgs),

    /// Force the active endpoint
    Active(ActiveArgs),

    /// Rewrite a request URL onto the active endpoint
    Adapt(AdaptArgs),

    /// Check that the active endpoint answers, failing over if it does not
    Ping(PingArgs),

    /// Manage configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── url ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UrlArgs {
    /// Print the API root (`<active>/api`) instead
    #[arg(long)]
    pub api: bool,
}

// ── webhook ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WebhookArgs {
    #[command(subcommand)]
    pub command: WebhookCommand,
}

#[derive(Debug, Subcommand)]
pub enum WebhookCommand {
    /// Print where webhook calls are sent
    Url,

    /// Update webhook registration details
    Set {
        /// Webhook identifier
        #[arg(long)]
        id: Option<String>,

        /// Webhook signing secret
        #[arg(long)]
        secret: Option<String>,

        /// Cloudhook URL used while the cloud relay is preferred
        #[arg(long, conflicts_with = "clear_cloudhook")]
        cloudhook: Option<String>,

        /// Remove the cloudhook URL
        #[arg(long)]
        clear_cloudhook: bool,
    },
}

// ── address ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AddressArgs {
    #[command(subcommand)]
    pub command: AddressCommand,
}

#[derive(Debug, Subcommand)]
pub enum AddressCommand {
    /// Set the address of an endpoint
    Set {
        endpoint: EndpointArg,
        /// Absolute URL, e.g. http://192.168.1.20:8123
        url: String,
    },

    /// Remove the address of an endpoint
    #[command(alias = "rm")]
    Clear { endpoint: EndpointArg },
}

// ── cloud ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CloudArgs {
    pub state: Toggle,
}

// ── networks ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NetworksArgs {
    #[command(subcommand)]
    pub command: NetworksCommand,
}

#[derive(Debug, Subcommand)]
pub enum NetworksCommand {
    /// List trusted networks
    #[command(alias = "ls")]
    List,

    /// Trust a network
    Add { name: String },

    /// Stop trusting a network
    #[command(alias = "rm")]
    Remove { name: String },
}

// ── active ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ActiveArgs {
    pub endpoint: EndpointArg,
}

// ── adapt ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AdaptArgs {
    /// URL of a request built against any endpoint
    pub url: String,

    /// Treat the request as a webhook call
    #[arg(long)]
    pub webhook: bool,
}

// ── ping ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PingArgs {
    /// Per-attempt timeout in seconds
    #[arg(long, short = 't', default_value = "10")]
    pub timeout: u64,
}

// ── config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup of a profile
    Init,

    /// Show the configuration with secrets masked
    Show,

    /// Print the config file path
    Path,

    /// Set the default profile
    Use { name: String },
}

// ── completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
