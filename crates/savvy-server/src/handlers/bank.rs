//! Connected bank handlers
//!
//! The link handshake itself happens elsewhere; these handlers store the
//! resulting access token and run the insight engine over fetched transactions.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::read_json;
use crate::{get_username, AppError, AppState};
use savvy_core::insights::{analyze_trends, summarize, CategorySummary, TrendReport};
use savvy_core::models::Transaction;
use savvy_core::source::{window, SUMMARY_WINDOW_DAYS, TRENDS_WINDOW_DAYS};

/// Transactions returned alongside the bank summary
pub const TRANSACTION_PREVIEW_LEN: usize = 10;

const NO_LINK: &str = "No connected bank account found";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkBankRequest {
    pub access_token: String,
    #[serde(default)]
    pub item_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BankTransactionsResponse {
    pub transactions: Vec<Transaction>,
    pub summary: CategorySummary,
}

/// Fetch the caller's transactions for the trailing `days`
async fn fetch_linked_transactions(
    state: &AppState,
    username: &str,
    days: i64,
) -> Result<Vec<Transaction>, AppError> {
    let link = state
        .db
        .get_bank_link(username)?
        .ok_or_else(|| AppError::bad_request(NO_LINK))?;

    let source = state
        .source
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("Bank aggregator not configured"))?;

    let (start, end) = window(days, Utc::now().date_naive());
    let transactions = source
        .transactions(&link.access_token, start, end)
        .await
        .map_err(AppError::from_core)?;

    info!(
        user = %username,
        source = source.name(),
        count = transactions.len(),
        %start,
        %end,
        "Fetched bank transactions"
    );
    Ok(transactions)
}

/// PUT /api/bank/link - Store the access token from a completed link handshake
pub async fn link_bank(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<MessageResponse>, AppError> {
    let username = get_username(&request);
    let req: LinkBankRequest = read_json(request, "accessToken is required").await?;

    let access_token = req.access_token.trim();
    if access_token.is_empty() {
        return Err(AppError::bad_request("accessToken is required"));
    }

    state
        .db
        .set_bank_link(&username, access_token, req.item_id.as_deref())?;

    state
        .db
        .log_audit(&username, "link", Some("bank_link"), None, req.item_id.as_deref())?;

    Ok(Json(MessageResponse {
        message: "Bank account connected successfully",
    }))
}

/// POST /api/bank/disconnect - Forget the stored access token
pub async fn disconnect_bank(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<MessageResponse>, AppError> {
    let username = get_username(&request);

    if !state.db.delete_bank_link(&username)? {
        return Err(AppError::bad_request(NO_LINK));
    }

    state
        .db
        .log_audit(&username, "unlink", Some("bank_link"), None, None)?;

    Ok(Json(MessageResponse {
        message: "Bank account disconnected successfully",
    }))
}

/// GET /api/bank/transactions - Last 30 days: a short preview plus the category summary
pub async fn get_bank_transactions(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<BankTransactionsResponse>, AppError> {
    let username = get_username(&request);

    let mut transactions =
        fetch_linked_transactions(&state, &username, SUMMARY_WINDOW_DAYS).await?;
    let summary = summarize(&transactions);

    state.db.log_audit(
        &username,
        "view",
        Some("bank_transactions"),
        None,
        Some(&format!("count={}", transactions.len())),
    )?;

    transactions.truncate(TRANSACTION_PREVIEW_LEN);
    Ok(Json(BankTransactionsResponse {
        transactions,
        summary,
    }))
}

/// GET /api/bank/insights - Trend report over the last 60 days
pub async fn get_bank_insights(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<TrendReport>, AppError> {
    let username = get_username(&request);

    let transactions = fetch_linked_transactions(&state, &username, TRENDS_WINDOW_DAYS).await?;
    let report = analyze_trends(&transactions);

    state.db.log_audit(
        &username,
        "view",
        Some("bank_insights"),
        None,
        Some(&format!("count={}", transactions.len())),
    )?;

    Ok(Json(report))
}
