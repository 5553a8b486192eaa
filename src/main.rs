//! Driftbox server — personal cloud storage.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use driftbox_auth::{AuthService, TokenIssuer};
use driftbox_blob::{BlobStore, LocalBlobStore};
use driftbox_core::config::AppConfig;
use driftbox_core::error::AppError;
use driftbox_index::DriveStore;
use driftbox_service::{FileService, FolderService, UploadService};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("DRIFTBOX_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let env = std::env::var("DRIFTBOX_ENV").unwrap_or_else(|_| "development".to_string());
    let env_config_path = format!("config/{env}.toml");

    AppConfig::load(&[config_path.as_str(), env_config_path.as_str()])
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Driftbox v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Open the drive index ─────────────────────────────
    let store = Arc::new(DriveStore::open(&config.index.path).await?);
    tracing::info!(path = %config.index.path, "Drive index opened");

    // ── Step 2: Initialize blob storage ──────────────────────────
    let blobs: Arc<dyn BlobStore> =
        Arc::new(LocalBlobStore::new(&config.storage.uploads_root).await?);
    tracing::info!(root = %config.storage.uploads_root, "Blob storage ready");

    // ── Step 3: Auth ─────────────────────────────────────────────
    let tokens = TokenIssuer::new(&config.auth);
    let auth = AuthService::new(Arc::clone(&store), tokens);

    // ── Step 4: Services ─────────────────────────────────────────
    let folders = FolderService::new(Arc::clone(&store), Arc::clone(&blobs));
    let files = FileService::new(Arc::clone(&store), Arc::clone(&blobs));
    let uploads = UploadService::new(
        Arc::clone(&store),
        Arc::clone(&blobs),
        config.storage.max_upload_size_bytes,
    );

    // ── Step 5: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 6: Background tasks ─────────────────────────────────
    let watcher_handle = if config.index.watch {
        Some(driftbox_index::spawn_index_watcher(
            Arc::clone(&store),
            Duration::from_millis(config.index.watch_interval_ms),
            shutdown_rx.clone(),
        ))
    } else {
        tracing::info!("Index watcher disabled");
        None
    };

    let janitor_handle = driftbox_service::spawn_blob_janitor(
        Arc::clone(&store),
        Arc::clone(&blobs),
        Duration::from_secs(config.storage.janitor_interval_seconds),
        Duration::from_secs(config.storage.janitor_min_age_seconds),
        shutdown_rx.clone(),
    );

    // ── Step 7: Build and start HTTP server ──────────────────────
    let app_state = driftbox_api::AppState {
        config: Arc::new(config.clone()),
        store,
        blobs,
        auth,
        folders,
        files,
        uploads,
    };

    let app = driftbox_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Driftbox server listening on {addr}");

    // ── Step 8: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Waiting for background tasks to complete...");
    if let Some(handle) = watcher_handle {
        let _ = tokio::time::timeout(Duration::from_secs(10), handle).await;
    }
    let _ = tokio::time::timeout(Duration::from_secs(10), janitor_handle).await;

    tracing::info!("Driftbox server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
