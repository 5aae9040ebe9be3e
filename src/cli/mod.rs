//! Command-line interface for Lemburr.

pub mod commands;

use clap::{Parser, Subcommand};

/// Lemburr - Overtime Request & Approval Tracker
#[derive(Parser)]
#[command(name = "lemburr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the API server
    #[command(alias = "-d", alias = "--daemon")]
    Daemon,

    /// List the user directory
    #[command(alias = "ls")]
    Users,

    /// List the overtime category registry
    Categories,

    /// Print per-user overtime summaries for a date period
    Report {
        /// Period start (YYYY-MM-DD, inclusive)
        start: String,
        /// Period end (YYYY-MM-DD, inclusive)
        end: String,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}
