//! Leaderboard command

use anyhow::Result;
use savvy_core::scoring::Page;
use savvy_core::Database;

/// Shorten a name to `max` characters for table display
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn cmd_leaderboard(db: &Database, page: Option<i64>, limit: Option<i64>) -> Result<()> {
    let page = Page::new(page, limit);
    let entries = db.leaderboard(page)?;

    if entries.is_empty() {
        if page.page > 1 {
            println!("No entries on page {}.", page.page);
        } else {
            println!("The leaderboard is empty. Submit financial data through the API:");
            println!("  POST /api/financial-data {{\"income\": 4000, \"expenses\": 3000}}");
        }
        return Ok(());
    }

    println!();
    println!("🏆 Leaderboard (page {}, {} per page)", page.page, page.limit);
    println!("   ─────────────────────────────────────────────────────────────");

    for ranked in entries {
        let savings = ranked
            .entry
            .savings
            .map(|s| format!("{:.2}%", s))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:>4} │ {:<24} │ {:>6} │ {:>8} │ {}",
            ranked.rank,
            truncate(&ranked.entry.username, 24),
            ranked.entry.score,
            savings,
            ranked.entry.created_at.format("%Y-%m-%d")
        );
    }

    Ok(())
}
