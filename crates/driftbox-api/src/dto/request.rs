//! Request payloads.

use serde::Deserialize;

use driftbox_entity::ROOT_FOLDER_ID;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
    /// Parent folder; omitted means the root.
    #[serde(default = "root_id")]
    pub parent_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub new_parent_id: u64,
}

fn root_id() -> u64 {
    ROOT_FOLDER_ID
}
