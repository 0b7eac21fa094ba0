//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod audit;
pub mod auth;
pub mod badges;
pub mod bank;
pub mod financial;
pub mod health;
pub mod insights;
pub mod leaderboard;
pub mod lessons;
pub mod profile;

// Re-export all handlers for use in router
pub use audit::*;
pub use auth::*;
pub use badges::*;
pub use bank::*;
pub use financial::*;
pub use health::*;
pub use insights::*;
pub use leaderboard::*;
pub use lessons::*;
pub use profile::*;

use axum::extract::Request;
use serde::de::DeserializeOwned;

use crate::AppError;

/// Maximum accepted JSON body (transaction uploads included)
pub const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Read and decode a JSON request body
///
/// Any read or decode failure becomes a 400 carrying `invalid_msg`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    request: Request,
    invalid_msg: &str,
) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request(invalid_msg))
}
