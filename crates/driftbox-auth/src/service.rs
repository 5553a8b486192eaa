//! Account registration, login, and token verification.

use std::sync::Arc;

use tracing::info;

use driftbox_core::error::AppError;
use driftbox_core::result::AppResult;
use driftbox_entity::{PublicUser, User};
use driftbox_index::DriveStore;

use crate::claims::Claims;
use crate::password::PasswordHasher;
use crate::token::{IssuedToken, TokenIssuer};

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

/// Authentication service over the shared drive store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<DriveStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

/// A signed-in session: the user plus their access token.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Session {
    pub user: PublicUser,
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

impl AuthService {
    pub fn new(store: Arc<DriveStore>, tokens: TokenIssuer) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(),
            tokens,
        }
    }

    /// Register a new account and sign it in.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AppResult<Session> {
        let email = email.trim();
        if !email.contains('@') {
            return Err(AppError::validation("A valid email address is required"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let password_hash = self.hasher.hash_password(password)?;
        let user = self.store.insert_user(name, email, &password_hash).await?;
        info!(user_id = user.id, "Registered new account");

        self.session_for(&user)
    }

    /// Sign in with email and password.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let user = self
            .store
            .find_user_by_email(email.trim())
            .await
            .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

        if !self.hasher.verify_password(password, &user.password_hash)? {
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        info!(user_id = user.id, "User signed in");
        self.session_for(&user)
    }

    /// Validate a bearer token.
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        self.tokens.verify(token)
    }

    /// The profile behind a set of verified claims.
    pub async fn me(&self, claims: &Claims) -> AppResult<PublicUser> {
        Ok(self.store.get_user(claims.sub).await?.public())
    }

    fn session_for(&self, user: &User) -> AppResult<Session> {
        let issued: IssuedToken = self.tokens.issue(user)?;
        Ok(Session {
            user: user.public(),
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftbox_core::config::AuthConfig;
    use driftbox_core::error::ErrorKind;

    async fn service(dir: &tempfile::TempDir) -> AuthService {
        let store = Arc::new(
            DriveStore::open(dir.path().join("drive.json"))
                .await
                .unwrap(),
        );
        AuthService::new(store, TokenIssuer::new(&AuthConfig::default()))
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service(&dir).await;

        let session = auth
            .register("Ada", "ada@example.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(session.user.email, "ada@example.com");

        let session = auth.login("ada@example.com", "correct horse").await.unwrap();
        let claims = auth.verify_token(&session.token).unwrap();
        assert_eq!(claims.sub, session.user.id);

        let me = auth.me(&claims).await.unwrap();
        assert_eq!(me.name, "Ada");
    }

    #[tokio::test]
    async fn test_register_validations() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service(&dir).await;

        let err = auth
            .register("Ada", "not-an-email", "correct horse")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = auth
            .register("Ada", "ada@example.com", "short")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service(&dir).await;

        auth.register("Ada", "ada@example.com", "correct horse")
            .await
            .unwrap();
        let err = auth
            .register("Other", "ADA@example.com", "another pass")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_bad_credentials_are_uniformly_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service(&dir).await;
        auth.register("Ada", "ada@example.com", "correct horse")
            .await
            .unwrap();

        let wrong_pass = auth.login("ada@example.com", "nope nope").await.unwrap_err();
        let wrong_email = auth.login("ghost@example.com", "whatever").await.unwrap_err();
        assert_eq!(wrong_pass.kind, ErrorKind::Unauthorized);
        assert_eq!(wrong_pass.message, wrong_email.message);
    }
}
