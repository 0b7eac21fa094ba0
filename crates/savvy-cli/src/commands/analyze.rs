//! Offline insight engine command

use std::path::Path;

use anyhow::{Context, Result};
use savvy_core::import::load_file;
use savvy_core::models::Transaction;
use savvy_core::{analyze_trends, summarize};
use tracing::info;

/// Summary, trends and commentary for a transaction list as one JSON document
pub fn analysis_json(transactions: &[Transaction]) -> serde_json::Value {
    let summary = summarize(transactions);
    let report = analyze_trends(transactions);
    serde_json::json!({
        "transactions": transactions.len(),
        "summary": summary,
        "trends": report.trends,
        "insights": report.insights,
    })
}

pub fn cmd_analyze(file: &Path, compact: bool) -> Result<()> {
    let transactions = load_file(file)
        .with_context(|| format!("Failed to load transactions from {}", file.display()))?;
    info!(count = transactions.len(), file = %file.display(), "Loaded transactions");

    let output = analysis_json(&transactions);
    let rendered = if compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{}", rendered);

    Ok(())
}
