//! CLI argument definitions for pagerpost-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use pagerpost_core::config::PagerpostConfig;

/// Forwards CLEF log events to PagerDuty as incidents.
///
/// Reads one JSON event per line from a file or stdin, and triggers a
/// PagerDuty incident for every event at or above the configured level.
#[derive(Parser, Debug)]
#[command(name = "pagerpost-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to pagerpost.toml configuration file.
    #[arg(short, long, default_value = "/etc/pagerpost/pagerpost.toml")]
    pub config: PathBuf,

    /// Override event input (`-` for stdin, otherwise a CLEF file path).
    #[arg(short, long)]
    pub input: Option<String>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}

impl DaemonCli {
    /// Applies command-line overrides on top of file and environment values.
    pub fn apply_overrides(&self, config: &mut PagerpostConfig) {
        if let Some(input) = &self.input {
            config.host.input = input.clone();
        }
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
    }
}
