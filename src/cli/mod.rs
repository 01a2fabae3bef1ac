//! Command-line interface.

pub mod commands;
pub mod output;
pub mod table;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::infrastructure::logging::LogConfig;
use commands::check::CheckArgs;
use commands::route::RouteArgs;

/// Exit status for a failed command (`EX_SOFTWARE`).
pub const EXIT_SOFTWARE: i32 = 70;

#[derive(Parser, Debug)]
#[command(name = "ldapcached")]
#[command(about = "Caching LDAP proxy", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log level; the first letter is enough (D, I, W, E, C)
    #[arg(short = 'l', long, global = true, default_value = "info")]
    pub log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(short = 'L', long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

impl Cli {
    pub fn log_config(&self) -> LogConfig {
        LogConfig::from_flags(self.quiet, &self.log_level, self.log_file.clone())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a configuration file and build every cache region
    Check(CheckArgs),

    /// Show which cache region a search filter is routed to
    Route(RouteArgs),
}

/// Report a failed command and exit with [`EXIT_SOFTWARE`].
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    tracing::error!(error = %format!("{err:#}"), "command failed");
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(EXIT_SOFTWARE);
}
