//! Authentication-related handlers

use axum::extract::Request;
use axum::Json;
use serde::Serialize;

use crate::{AuthMethod, Identity, LOCAL_USER};

/// Response for the /api/me endpoint
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    /// The authenticated user's identifier
    pub user: String,
    /// How the user was authenticated
    pub auth_method: &'static str,
}

/// GET /api/me - Get the currently authenticated user
pub async fn get_me(request: Request) -> Json<MeResponse> {
    let (user, method) = match request.extensions().get::<Identity>() {
        Some(identity) => (identity.user.clone(), identity.method),
        None => (LOCAL_USER.to_string(), AuthMethod::None),
    };

    Json(MeResponse {
        user,
        auth_method: method.as_str(),
    })
}
