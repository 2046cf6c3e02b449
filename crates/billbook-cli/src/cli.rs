//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Billbook - Track household bills month by month
#[derive(Debug, Parser)]
#[command(name = "billbook")]
#[command(about = "Household bills tracker with monthly paid status", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Bills file path (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an empty bills file
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Allowed CORS origin (repeatable; also read from BILLBOOK_ALLOWED_ORIGINS)
        ///
        /// Without any allowed origin, browsers may only call the API from the
        /// same origin. Use "*" to allow any origin.
        #[arg(long = "allow-origin")]
        allow_origins: Vec<String>,
    },

    /// List bills, with paid status when a month is given
    List {
        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Add a bill
    Add {
        /// Bill name
        #[arg(long)]
        name: String,

        /// Day of the month the bill is due (1-31)
        #[arg(long)]
        due_day: u32,

        /// Amount due
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,

        /// Mark as a one-time bill instead of recurring
        #[arg(long)]
        one_time: bool,

        /// Explicit bill id (generated if omitted)
        #[arg(long)]
        id: Option<String>,
    },

    /// Remove a bill and its paid history
    Remove {
        /// Bill ID
        id: String,
    },

    /// Mark a bill as paid
    Pay {
        /// Bill ID
        id: String,

        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Mark a bill as unpaid
    Unpay {
        /// Bill ID
        id: String,

        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Show monthly totals
    Summary {
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Ask the assistant a question about a month's bills
    Ask {
        /// Question to ask
        question: String,

        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Show data file and assistant status
    Status,

    /// Print the bills document as JSON
    Export,
}
