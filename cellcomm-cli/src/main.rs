//! cellcomm CLI - Command-line tool for battery-test communication boards.
//!
//! ## Features
//!
//! - Discover attached boards of both families
//! - Inspect the effective timing, command and discovery configuration
//! - Environment variable support

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::debug;
use std::env;
use std::path::PathBuf;

mod commands;
mod config;

use config::Config;

/// cellcomm - Control layer for battery-test communication boards.
///
/// Environment variables:
///   CELLCOMM_FAMILY_A_ID   - Identifier matched against family A USB descriptors
#[derive(Parser)]
#[command(name = "cellcomm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Identifier string for family A boards (overrides configuration).
    #[arg(long, global = true, env = "CELLCOMM_FAMILY_A_ID")]
    family_a_id: Option<String>,

    /// Verbose output level (-v, -vv, -vvv for increasing detail).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-essential output).
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a configuration file.
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// List attached communication boards.
    Ports {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration.
    Config {
        /// Output as JSON instead of TOML.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    if env::var("NO_COLOR").is_ok() || !console::Term::stderr().is_term() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_target(cli.verbose >= 2)
        .format_timestamp(if cli.verbose >= 2 {
            Some(env_logger::TimestampPrecision::Millis)
        } else {
            None
        })
        .init();

    debug!(
        "cellcomm v{} (verbose level: {})",
        env!("CARGO_PKG_VERSION"),
        cli.verbose
    );

    let mut config = if let Some(ref path) = cli.config_path {
        Config::load_from_path(path)
    } else {
        Config::load()
    };
    if let Some(id) = cli.family_a_id {
        config.discovery.family_a_id = Some(id);
    }

    match cli.command {
        Commands::Ports { json } => commands::ports::cmd_ports(&config, json, cli.quiet),
        Commands::Config { json } => commands::show_config::cmd_show_config(&config, json),
    }
}
