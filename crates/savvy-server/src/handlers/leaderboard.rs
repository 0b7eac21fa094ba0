//! Leaderboard handlers

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::read_json;
use crate::{get_username, AppError, AppState};
use savvy_core::models::RankedEntry;
use savvy_core::scoring::{validate_score, Page};

/// Pagination query; unparseable values fall back to defaults
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl LeaderboardQuery {
    fn page(&self) -> Page {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
        Page::new(parse(&self.page), parse(&self.limit))
    }
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub message: &'static str,
    pub score: i64,
}

/// GET /api/leaderboard - Ranked entries, highest score first
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<Vec<RankedEntry>>, AppError> {
    let entries = state.db.leaderboard(params.page())?;
    Ok(Json(entries))
}

/// POST /api/score - Submit a score directly
pub async fn submit_score(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ScoreResponse>, AppError> {
    let username = get_username(&request);
    let req: ScoreRequest = read_json(request, "A positive score is required").await?;

    let score = req
        .score
        .ok_or_else(|| AppError::bad_request("A positive score is required"))
        .and_then(|s| validate_score(s).map_err(AppError::from_core))?;

    let id = state.db.insert_leaderboard_entry(&username, score, None)?;

    state.db.log_audit(
        &username,
        "create",
        Some("leaderboard_entry"),
        Some(id),
        Some(&format!("score={}", score)),
    )?;

    Ok(Json(ScoreResponse {
        message: "Score submitted",
        score,
    }))
}
