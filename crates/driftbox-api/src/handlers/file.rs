//! File handlers: metadata CRUD, upload, and download.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;

use driftbox_core::error::AppError;
use driftbox_entity::ROOT_FOLDER_ID;

use crate::dto::request::{MoveRequest, RenameRequest};
use crate::dto::response::FileResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ListParams};
use crate::state::AppState;

/// GET /api/files
pub async fn list_files(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let public_url = &state.config.server.public_url;
    let files: Vec<FileResponse> = state
        .files
        .list(&params.into_query())
        .await
        .into_iter()
        .map(|f| FileResponse::new(f, public_url))
        .collect();
    Ok(Json(serde_json::json!({ "success": true, "data": files })))
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file = state.files.get(id).await?;
    let file = FileResponse::new(file, &state.config.server.public_url);
    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}

/// POST /api/files/upload (multipart)
///
/// Expects a `file` part; an optional `parent_id` text part selects the
/// destination folder (root when omitted).
pub async fn upload_file(
    State(state): State<AppState>,
    _auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut parent_id = ROOT_FOLDER_ID;
    let mut upload: Option<(String, Option<String>, bytes::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("parent_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Unreadable parent_id: {e}")))?;
                parent_id = text
                    .trim()
                    .parse()
                    .map_err(|_| AppError::validation("parent_id must be an integer"))?;
            }
            Some("file") => {
                let name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::validation("Upload is missing a file name"))?;
                let mime = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Unreadable upload body: {e}")))?;
                upload = Some((name, mime, data));
            }
            _ => {}
        }
    }

    let (name, mime, data) =
        upload.ok_or_else(|| AppError::validation("Multipart field 'file' is required"))?;

    let file = state.uploads.ingest(&name, mime, parent_id, data).await?;
    let file = FileResponse::new(file, &state.config.server.public_url);
    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}

/// GET /api/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let (file, stream) = state.files.download(id).await?;

    let mut headers = HeaderMap::new();
    let content_type = file
        .mime_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    if let Ok(value) = content_type.parse() {
        headers.insert(header::CONTENT_TYPE, value);
    }
    let disposition = format!("attachment; filename=\"{}\"", file.name.replace('"', ""));
    if let Ok(value) = disposition.parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((headers, Body::from_stream(stream)))
}

/// PUT /api/files/{id}
pub async fn rename_file(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<u64>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file = state.files.rename(id, &req.name).await?;
    let file = FileResponse::new(file, &state.config.server.public_url);
    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}

/// PUT /api/files/{id}/move
pub async fn move_file(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<u64>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file = state.files.move_to(id, req.new_parent_id).await?;
    let file = FileResponse::new(file, &state.config.server.public_url);
    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.files.delete(id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "File deleted" } }),
    ))
}

/// POST /api/files/{id}/star
pub async fn star_file(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file = state.files.set_starred(id, true).await?;
    let file = FileResponse::new(file, &state.config.server.public_url);
    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}

/// DELETE /api/files/{id}/star
pub async fn unstar_file(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file = state.files.set_starred(id, false).await?;
    let file = FileResponse::new(file, &state.config.server.public_url);
    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}
