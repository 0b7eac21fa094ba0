//! Insight engine handlers for caller-supplied transactions

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::Deserialize;

use super::read_json;
use crate::{get_username, AppError, AppState};
use savvy_core::insights::{analyze_trends, summarize, CategorySummary, TrendReport};
use savvy_core::models::Transaction;

#[derive(Debug, Deserialize)]
pub struct TransactionsRequest {
    pub transactions: Vec<Transaction>,
}

/// POST /api/insights/summary - Category summary over the posted transactions
pub async fn summarize_transactions(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<CategorySummary>, AppError> {
    let username = get_username(&request);
    let req: TransactionsRequest = read_json(request, "Invalid transaction list").await?;

    let summary = summarize(&req.transactions);

    state.db.log_audit(
        &username,
        "analyze",
        Some("insight_summary"),
        None,
        Some(&format!("transactions={}", req.transactions.len())),
    )?;

    Ok(Json(summary))
}

/// POST /api/insights/trends - Monthly trends and commentary over the posted transactions
pub async fn analyze_transaction_trends(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<TrendReport>, AppError> {
    let username = get_username(&request);
    let req: TransactionsRequest = read_json(request, "Invalid transaction list").await?;

    let report = analyze_trends(&req.transactions);

    state.db.log_audit(
        &username,
        "analyze",
        Some("insight_trends"),
        None,
        Some(&format!(
            "transactions={}, months={}",
            req.transactions.len(),
            report.trends.savings_rate.len()
        )),
    )?;

    Ok(Json(report))
}
