//! Manual income/expense submission handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use super::read_json;
use crate::{get_username, AppError, AppState};
use savvy_core::insights::recent_insight;
use savvy_core::models::NewFinancialEntry;
use savvy_core::scoring::score_for;

#[derive(Debug, Serialize)]
pub struct FinancialSubmitResponse {
    pub message: &'static str,
    pub score: i64,
    pub savings: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFinancialData {
    pub last_score: Option<i64>,
    pub last_income: Option<f64>,
    pub last_expenses: Option<f64>,
    pub insight: Option<&'static str>,
}

/// POST /api/financial-data - Store an entry and post its score to the leaderboard
pub async fn submit_financial_data(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<FinancialSubmitResponse>, AppError> {
    let username = get_username(&request);
    let entry: NewFinancialEntry =
        read_json(request, "Income and expenses must be numbers").await?;
    entry.validate().map_err(AppError::from_core)?;

    let entry_id = state.db.insert_financial_entry(&username, &entry)?;

    let score = score_for(entry.income, entry.expenses);
    let leaderboard_id = state
        .db
        .insert_leaderboard_entry(&username, score.score, Some(score.savings))?;

    info!(
        user = %username,
        score = score.score,
        savings = score.savings,
        "Financial data scored"
    );

    state.db.log_audit(
        &username,
        "create",
        Some("financial_data"),
        Some(entry_id),
        Some(&format!(
            "score={}, leaderboard_entry={}",
            score.score, leaderboard_id
        )),
    )?;

    Ok(Json(FinancialSubmitResponse {
        message: "Financial data submitted and leaderboard updated",
        score: score.score,
        savings: score.savings,
    }))
}

/// GET /api/financial-data/recent - Latest score and entry with a one-line insight
pub async fn get_recent_financial_data(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<RecentFinancialData>, AppError> {
    let username = get_username(&request);

    let last_score = state.db.latest_leaderboard_entry(&username)?;
    let last_entry = state
        .db
        .recent_financial_entries(&username, 1)?
        .into_iter()
        .next();

    state
        .db
        .log_audit(&username, "view", Some("financial_data"), None, Some("recent"))?;

    Ok(Json(RecentFinancialData {
        last_score: last_score.map(|e| e.score),
        last_income: last_entry.as_ref().map(|e| e.income),
        last_expenses: last_entry.as_ref().map(|e| e.expenses),
        insight: last_entry
            .as_ref()
            .and_then(|e| recent_insight(e.income, e.expenses)),
    }))
}
