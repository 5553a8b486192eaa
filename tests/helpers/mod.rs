//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use driftbox_api::AppState;
use driftbox_auth::{AuthService, TokenIssuer};
use driftbox_blob::{BlobStore, LocalBlobStore};
use driftbox_core::config::AppConfig;
use driftbox_index::DriveStore;
use driftbox_service::{FileService, FolderService, UploadService};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    /// Temp directory holding the index file and blobs for this test
    _dir: TempDir,
}

impl TestApp {
    /// Create a new test application backed by a fresh temp directory
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.index.path = dir
            .path()
            .join("drive.json")
            .to_string_lossy()
            .into_owned();
        config.storage.uploads_root = dir
            .path()
            .join("uploads")
            .to_string_lossy()
            .into_owned();

        let store = Arc::new(
            DriveStore::open(&config.index.path)
                .await
                .expect("Failed to open drive store"),
        );
        let blobs: Arc<dyn BlobStore> = Arc::new(
            LocalBlobStore::new(&config.storage.uploads_root)
                .await
                .expect("Failed to init blob store"),
        );

        let tokens = TokenIssuer::new(&config.auth);
        let auth = AuthService::new(Arc::clone(&store), tokens);
        let folders = FolderService::new(Arc::clone(&store), Arc::clone(&blobs));
        let files = FileService::new(Arc::clone(&store), Arc::clone(&blobs));
        let uploads = UploadService::new(
            Arc::clone(&store),
            Arc::clone(&blobs),
            config.storage.max_upload_size_bytes,
        );

        let state = AppState {
            config: Arc::new(config.clone()),
            store,
            blobs,
            auth,
            folders,
            files,
            uploads,
        };

        let router = driftbox_api::build_router(state);

        Self {
            router,
            config,
            _dir: dir,
        }
    }

    /// Register an account and return its access token
    pub async fn register(&self, name: &str, email: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": password,
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Register failed: {:?}",
            response.body
        );

        response.data()["token"]
            .as_str()
            .expect("No token in register response")
            .to_string()
    }

    /// Login and return the access token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({
                    "email": email,
                    "password": password,
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.data()["token"]
            .as_str()
            .expect("No token in login response")
            .to_string()
    }

    /// Make a JSON HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Upload a file via multipart, optionally into a folder
    pub async fn upload(
        &self,
        token: &str,
        file_name: &str,
        content: &[u8],
        parent_id: Option<u64>,
    ) -> TestResponse {
        let boundary = "driftbox-test-boundary";
        let mut body = Vec::new();

        if let Some(parent_id) = parent_id {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"parent_id\"\r\n\r\n{parent_id}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri("/api/files/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::from(body))
            .expect("Failed to build upload request");

        self.send(req).await
    }

    /// Download a file's raw bytes
    pub async fn download(&self, token: &str, file_id: u64) -> (StatusCode, Vec<u8>) {
        let req = Request::builder()
            .method("GET")
            .uri(format!("/api/files/{file_id}/download"))
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .expect("Failed to build download request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        (status, bytes.to_vec())
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` payload of a success envelope
    pub fn data(&self) -> &Value {
        self.body.get("data").unwrap_or(&Value::Null)
    }
}
