//! Lesson recommendation handler

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};

use crate::{get_username, AppError, AppState};
use savvy_core::lessons::{recommend, LessonPlan, HABIT_WINDOW};

/// GET /api/lessons - Lessons picked from goal keywords and recent spending
pub async fn get_lessons(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<LessonPlan>, AppError> {
    let username = get_username(&request);

    let profile = state.db.get_profile(&username)?;
    let recent = state
        .db
        .recent_financial_entries(&username, HABIT_WINDOW as i64)?;
    let plan = recommend(profile.as_ref().map(|p| p.goal.as_str()), &recent);

    state.db.log_audit(
        &username,
        "view",
        Some("lessons"),
        None,
        Some(&format!("count={}", plan.lessons.len())),
    )?;

    Ok(Json(plan))
}
