//! JWT claims carried by access tokens.

use serde::{Deserialize, Serialize};

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Owning user's id.
    pub sub: u64,
    /// Owning user's email.
    pub email: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}
