//! Savvy CLI - Savings leaderboard and spending insights
//!
//! Usage:
//!   savvy init                     Initialize database
//!   savvy serve --port 5500        Start web server
//!   savvy analyze --file tx.csv    Summarize a transaction export
//!   savvy leaderboard              Show the ranking
//!   savvy reset --scope all        Clear stored data

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
        } => commands::cmd_serve(&cli.db, &host, port, no_auth, cli.no_encrypt).await,
        Commands::Analyze { file, compact } => commands::cmd_analyze(&file, compact),
        Commands::Leaderboard { page, limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_leaderboard(&db, page, limit)
        }
        Commands::Reset { scope, yes } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_reset(&db, scope, yes)
        }
    }
}
