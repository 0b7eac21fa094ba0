//! Data reset command

use std::io::{self, Write};

use anyhow::Result;
use savvy_core::{Database, ResetScope};

fn describe(scope: ResetScope) -> &'static str {
    match scope {
        ResetScope::Leaderboard => "all leaderboard entries",
        ResetScope::FinancialData => "all submitted financial data",
        ResetScope::All => "ALL data: leaderboard, financial data, profiles, bank links, audit log",
    }
}

pub fn cmd_reset(db: &Database, scope: ResetScope, yes: bool) -> Result<()> {
    if !yes {
        println!("⚠️  This will delete {}.", describe(scope));
        print!("Are you sure? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    db.reset(scope)?;
    println!("✅ Cleared {}.", describe(scope));

    Ok(())
}
