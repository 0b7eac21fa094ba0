//! Activity history for the calling user

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use serde::Deserialize;

use crate::{get_username, AppError, AppState, MAX_AUDIT_LIMIT};
use savvy_core::AuditEntry;

const DEFAULT_AUDIT_LIMIT: i64 = 100;

/// `?limit=`; anything unparseable means the default
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<String>,
}

impl AuditQuery {
    fn limit(&self) -> i64 {
        self.limit
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_AUDIT_LIMIT)
            .clamp(1, MAX_AUDIT_LIMIT)
    }
}

/// GET /api/audit - The caller's own audit entries, newest first
///
/// Rows written on behalf of other users are never returned.
pub async fn list_audit_log(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuditQuery>,
    request: Request,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let username = get_username(&request);
    let limit = params.limit();

    let entries = state.db.list_audit_log(&username, limit)?;
    tracing::debug!(user = %username, count = entries.len(), "Listed audit entries");

    state
        .db
        .log_audit(&username, "list", Some("audit_log"), None, None)?;

    Ok(Json(entries))
}
