//! Folder handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use crate::dto::request::{CreateFolderRequest, MoveRequest, RenameRequest};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ListParams};
use crate::state::AppState;

/// GET /api/folders
pub async fn list_folders(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folders = state.folders.list(&params.into_query()).await;
    Ok(Json(serde_json::json!({ "success": true, "data": folders })))
}

/// GET /api/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folder = state.folders.get(id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": folder })))
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<CreateFolderRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folder = state.folders.create(&req.name, req.parent_id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": folder })))
}

/// PUT /api/folders/{id}
pub async fn rename_folder(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<u64>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folder = state.folders.rename(id, &req.name).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": folder })))
}

/// PUT /api/folders/{id}/move
pub async fn move_folder(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<u64>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folder = state.folders.move_to(id, req.new_parent_id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": folder })))
}

/// DELETE /api/folders/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.folders.delete_recursive(id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Folder deleted" } }),
    ))
}

/// POST /api/folders/{id}/star
pub async fn star_folder(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folder = state.folders.set_starred(id, true).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": folder })))
}

/// DELETE /api/folders/{id}/star
pub async fn unstar_folder(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folder = state.folders.set_starred(id, false).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": folder })))
}
