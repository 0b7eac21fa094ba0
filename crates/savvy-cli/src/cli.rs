//! CLI argument definitions using clap
//!
//! The command implementations live in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use savvy_core::ResetScope;

/// Savvy - Compete on savings rate, learn from your spending
#[derive(Parser)]
#[command(name = "savvy")]
#[command(about = "Savings-rate leaderboard with spending insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "savvy.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default the database is encrypted with SQLCipher using the
    /// passphrase in SAVVY_DB_KEY.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5500")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default the server requires an x-authenticated-user header from the
        /// fronting proxy, an API key, or a trusted network.
        #[arg(long)]
        no_auth: bool,
    },

    /// Summarize and trend a transaction file (JSON array or CSV)
    Analyze {
        /// Transaction file (.json or .csv with date,amount,category columns)
        #[arg(short, long)]
        file: PathBuf,

        /// Print single-line JSON instead of pretty output
        #[arg(long)]
        compact: bool,
    },

    /// Show the leaderboard
    Leaderboard {
        /// Page number (1-based)
        #[arg(long)]
        page: Option<i64>,

        /// Entries per page (max 100)
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Clear stored data
    Reset {
        /// What to clear: leaderboard, financial-data, all
        #[arg(long)]
        scope: ResetScope,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
