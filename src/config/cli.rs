//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::defaults;

/// reachwatch: network reachability classifier
///
/// Classifies the active network (offline, wifi-like, cellular metered or
/// unmetered, other) and reports every change, optionally to a webhook.
#[derive(Debug, Parser)]
#[command(name = "reachwatch")]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Subcommand to run (default: watch)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Webhook URL notified on every transition
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// HTTP method for webhook requests
    #[arg(long, global = true)]
    pub method: Option<String>,

    /// HTTP headers in 'Key=Value' or 'Key: Value' format (repeatable)
    #[arg(long = "header", value_name = "K=V", global = true)]
    pub headers: Vec<String>,

    /// Bearer token for the Authorization header
    #[arg(long, global = true)]
    pub bearer: Option<String>,

    /// Handlebars body template for webhook requests
    #[arg(long = "body-template", global = true)]
    pub body_template: Option<String>,

    /// Maximum number of delivery attempts
    #[arg(long = "retry-max", global = true)]
    pub retry_max: Option<u32>,

    /// Initial retry delay in seconds
    #[arg(long = "retry-delay", global = true)]
    pub retry_delay: Option<u64>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Report cellular networks as unmetered
    #[arg(long = "unmetered-cellular", global = true)]
    pub unmetered_cellular: bool,

    /// Treat a default interface without a gateway as offline
    #[arg(long = "require-gateway", global = true)]
    pub require_gateway: bool,

    /// Log transitions without sending webhooks
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for reachwatch
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = defaults::CONFIG_FILE)]
        output: PathBuf,
    },

    /// Print the current classification once
    Status(OutputArgs),

    /// List network interfaces as seen by the classifier
    Interfaces(OutputArgs),

    /// Watch for changes and report transitions (default)
    Watch,
}

/// Output format options shared by one-shot commands.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct OutputArgs {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
