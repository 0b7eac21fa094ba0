//! Profile handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::Serialize;

use super::read_json;
use crate::{get_username, AppError, AppState};
use savvy_core::models::{Profile, ProfileUpdate};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub goal: String,
    pub full_name: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdateResponse {
    pub message: &'static str,
    pub profile: ProfileSummary,
}

/// GET /api/profile - Stored profile, or defaults for new users
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Profile>, AppError> {
    let username = get_username(&request);
    let profile = state.db.get_profile(&username)?.unwrap_or_default();

    state
        .db
        .log_audit(&username, "view", Some("profile"), None, None)?;

    Ok(Json(profile))
}

/// POST /api/profile - Merge the submitted fields into the stored profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ProfileUpdateResponse>, AppError> {
    let username = get_username(&request);
    let update: ProfileUpdate = read_json(request, "Invalid profile data").await?;

    let invalid_number = [
        update.income,
        update.target_savings_rate,
        update.monthly_budget,
        update.savings_goal,
        update.savings_timeframe,
    ]
    .into_iter()
    .flatten()
    .any(|v| v < 0.0);
    if invalid_number {
        return Err(AppError::bad_request("Profile amounts cannot be negative"));
    }

    let changed: Vec<&str> = [
        ("goal", update.goal.is_some()),
        ("fullName", update.full_name.is_some()),
        ("income", update.income.is_some()),
        ("targetSavingsRate", update.target_savings_rate.is_some()),
        ("monthlyBudget", update.monthly_budget.is_some()),
        ("savingsGoal", update.savings_goal.is_some()),
        ("savingsTimeframe", update.savings_timeframe.is_some()),
    ]
    .into_iter()
    .filter_map(|(name, set)| set.then_some(name))
    .collect();

    let profile = state
        .db
        .get_profile(&username)?
        .unwrap_or_default()
        .merge(update);
    state.db.upsert_profile(&username, &profile)?;

    state.db.log_audit(
        &username,
        "update",
        Some("profile"),
        None,
        Some(&format!("fields={}", changed.join(","))),
    )?;

    Ok(Json(ProfileUpdateResponse {
        message: "Profile updated",
        profile: ProfileSummary {
            goal: profile.goal,
            full_name: profile.full_name,
        },
    }))
}
