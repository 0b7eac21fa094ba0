//! Badge handler

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};

use crate::{get_username, AppError, AppState};
use savvy_core::badges::{evaluate, Badge};

/// GET /api/badges - Badge catalog with earned state for the caller
pub async fn get_badges(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Badge>>, AppError> {
    let username = get_username(&request);

    let entries = state.db.list_financial_entries(&username)?;
    let profile = state.db.get_profile(&username)?.unwrap_or_default();
    let badges = evaluate(&entries, &profile);

    let earned = badges.iter().filter(|b| b.earned).count();
    state.db.log_audit(
        &username,
        "view",
        Some("badges"),
        None,
        Some(&format!("earned={}", earned)),
    )?;

    Ok(Json(badges))
}
