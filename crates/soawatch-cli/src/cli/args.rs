//! Command-line argument definitions using clap.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Watch DNS zones for SOA serial changes
///
/// Every check asks several independent DNS-over-HTTPS resolvers, takes a
/// majority vote, confirms changes with a second round and announces each
/// serial once per dedup window.
#[derive(Parser, Debug)]
#[command(name = "soawatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: <config dir>/soawatch/config.toml)
    #[arg(short, long, env = "SOAWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Store file, overriding store.path from the config
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every due zone once and print the summary
    Tick,

    /// Serve the trigger endpoint (POST /tick, GET /health)
    Serve(ServeArgs),

    /// Run one consensus round for a zone without touching the store
    Check(CheckArgs),

    /// Manage monitored zones
    Zone(ZoneArgs),

    /// Manage notification channels
    Channel(ChannelArgs),
}

// ============================================================================
// Serve command
// ============================================================================

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address, overriding server.listen from the config
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,
}

// ============================================================================
// Check command
// ============================================================================

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Zone apex, e.g. example.com
    pub zone: String,
}

// ============================================================================
// Zone command
// ============================================================================

#[derive(Args, Debug)]
pub struct ZoneArgs {
    #[command(subcommand)]
    pub command: ZoneCommands,
}

#[derive(Subcommand, Debug)]
pub enum ZoneCommands {
    /// Start monitoring a zone
    Add {
        /// Zone apex, e.g. example.com
        name: String,

        /// Owning user; selects notification channels
        #[arg(long)]
        owner: String,

        /// Polling interval in seconds (clamped to 1-60 when scheduling)
        #[arg(long, default_value_t = 60)]
        cadence: i64,

        /// Zone ID (default: the zone name)
        #[arg(long)]
        id: Option<String>,
    },

    /// List monitored zones
    List,

    /// Stop monitoring a zone; its history is kept
    Remove {
        /// Zone ID
        id: String,
    },
}

// ============================================================================
// Channel command
// ============================================================================

#[derive(Args, Debug)]
pub struct ChannelArgs {
    #[command(subcommand)]
    pub command: ChannelCommands,
}

#[derive(Subcommand, Debug)]
pub enum ChannelCommands {
    /// Attach a notification target to an owner
    Add {
        /// Owning user
        owner: String,

        /// Channel type
        #[arg(value_enum)]
        kind: ChannelKindArg,

        /// Email address or webhook URL
        target: String,
    },

    /// List an owner's notification targets
    List {
        /// Owning user
        owner: String,
    },
}

/// Channel types accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChannelKindArg {
    /// Email through the configured gateway
    Email,
    /// Slack incoming webhook URL
    Slack,
    /// Microsoft Teams connector URL
    Teams,
    /// Generic JSON webhook URL
    Webhook,
}
