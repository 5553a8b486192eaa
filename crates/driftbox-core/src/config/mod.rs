//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a serde default so the server can start
//! with no configuration file at all.

pub mod auth;
pub mod index;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use self::auth::AuthConfig;
pub use self::index::IndexConfig;
pub use self::logging::LoggingConfig;
pub use self::storage::StorageConfig;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay) and
/// `DRIFTBOX_`-prefixed environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Blob storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Drive index (persisted document) settings.
    #[serde(default)]
    pub index: IndexConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the given TOML files (later files override
    /// earlier ones) with a `DRIFTBOX_`-prefixed environment overlay on top.
    ///
    /// Missing files are skipped rather than treated as errors.
    pub fn load(paths: &[&str]) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        for path in paths {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("DRIFTBOX")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Externally visible base URL, used when building file download links.
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Allowed CORS origins ("*" allows any).
    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: default_public_url(),
            cors_allowed_origins: default_cors_origins(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3030
}

fn default_public_url() -> String {
    "http://localhost:3030".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
