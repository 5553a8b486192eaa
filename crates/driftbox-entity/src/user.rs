//! User account entity.
//!
//! Users are owned by the auth layer and opaque to the drive engine; they
//! live in the same persisted document.

use serde::{Deserialize, Serialize};

/// A registered user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Login email, unique across accounts.
    pub email: String,
    /// Argon2id password hash.
    pub password_hash: String,
}

/// The user shape exposed over the API (no credential material).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    /// Unique user identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
}

impl User {
    /// Strip credential material for API responses.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}
