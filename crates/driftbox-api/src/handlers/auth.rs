//! Account registration, login, and profile handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = state
        .auth
        .register(&req.name, &req.email, &req.password)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": session })))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": session })))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let profile = state.auth.me(&auth.0).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": profile })))
}
