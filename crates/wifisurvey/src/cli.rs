//! Clap derive structures for the `wifisurvey` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Also
//! compiled into `build.rs` for man page generation, so it depends on
//! nothing but clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wifisurvey -- measure Wi-Fi signal and throughput at a spot
#[derive(Debug, Parser)]
#[command(
    name = "wifisurvey",
    version,
    about = "Wi-Fi site survey from the command line",
    long_about = "Measures signal strength, association details and iperf3 throughput\n\
        at the current location, using the operating system's own Wi-Fi tools\n\
        (wdutil / system_profiler on macOS, netsh on Windows).",
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
    /// Survey profile to use
    #[arg(long, short = 'p', env = "WIFISURVEY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// iperf3 server as host or host:port ('localhost' skips throughput)
    #[arg(long, short = 's', env = "WIFISURVEY_SERVER", global = true)]
    pub server: Option<String>,

    /// Seconds per throughput phase
    #[arg(long, short = 'd', env = "WIFISURVEY_DURATION", global = true)]
    pub duration: Option<u32>,

    /// Wi-Fi interface (discovered when omitted)
    #[arg(long, short = 'i', env = "WIFISURVEY_INTERFACE", global = true)]
    pub interface: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WIFISURVEY_OUTPUT",
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

    /// Prompt for the sudo password instead of reading it from config
    #[arg(long, global = true)]
    pub ask_password: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// Run one measurement: radio restart, scans and throughput phases
    Survey,

    /// Show the current Wi-Fi association
    Scan(ScanArgs),

    /// Parse captured command output offline
    Parse(ParseArgs),

    /// Check that the iperf3 server accepts connections
    CheckServer(CheckServerArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Scan ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// List other visible networks instead of the current association
    #[arg(long, short = 'c', conflicts_with = "saved_profiles")]
    pub candidates: bool,

    /// List saved Wi-Fi profiles (Windows)
    #[arg(long)]
    pub saved_profiles: bool,
}

// ── Parse ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Which tool produced the file
    pub kind: ParseKind,

    /// Captured output ('-' reads stdin)
    pub file: PathBuf,

    /// SSID to look up (netsh-profile)
    #[arg(long, required_if_eq("kind", "netsh-profile"))]
    pub ssid: Option<String>,

    /// Protocol of the test (iperf)
    #[arg(long, default_value = "tcp")]
    pub protocol: ProtocolArg,

    /// Show visible networks instead of the current one (system-profiler)
    #[arg(long)]
    pub candidates: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ParseKind {
    /// `sudo wdutil info` (macOS)
    Wdutil,
    /// `system_profiler -json SPAirPortDataType` (macOS)
    SystemProfiler,
    /// `netsh wlan show interfaces` (Windows)
    NetshInterfaces,
    /// `netsh wlan show networks mode=bssid` (Windows)
    NetshNetworks,
    /// `netsh wlan show profiles` (Windows)
    NetshProfiles,
    /// `netsh wlan show profiles name=*` (Windows)
    NetshProfile,
    /// `iperf3 -J` report
    Iperf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProtocolArg {
    Tcp,
    Udp,
}

// ── Check server ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CheckServerArgs {
    /// Connect timeout in seconds (defaults to the configured timeout)
    #[arg(long, short = 't')]
    pub timeout: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or extend the config file with guided setup
    Init,

    /// Display current configuration (secrets redacted)
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
