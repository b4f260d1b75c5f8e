//! Shared fixtures for post-service HTTP tests
#![allow(dead_code)]

pub mod memory_store;

pub use memory_store::MemoryPostStore;

use actix_web::web;
use crypto_core::JwtKeys;
use post_service::config::FeedConfig;
use post_service::storage::LocalBlobStore;
use post_service::AppState;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

pub const TEST_SECRET: &str = "post-service-test-secret-0123456789abcdef";
pub const MULTIPART_BOUNDARY: &str = "----pixwall-test-boundary";

/// Application state over an in-memory store and a temp upload directory
pub struct TestContext {
    pub store: MemoryPostStore,
    pub keys: Arc<JwtKeys>,
    pub state: web::Data<AppState>,
    /// Kept alive for the duration of the test
    pub upload_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_limits(FeedConfig::default(), 1024 * 1024).await
    }

    pub async fn with_limits(feed: FeedConfig, upload_max_bytes: usize) -> Self {
        let upload_dir = tempfile::tempdir().expect("create temp upload dir");
        let blobs = LocalBlobStore::open(upload_dir.path())
            .await
            .expect("open blob store");
        let store = MemoryPostStore::new();
        let keys = Arc::new(JwtKeys::from_secret(TEST_SECRET));

        let state = web::Data::new(AppState::new(
            Arc::new(store.clone()),
            Arc::new(blobs),
            keys.clone(),
            feed,
            upload_max_bytes,
        ));

        Self {
            store,
            keys,
            state,
            upload_dir,
        }
    }

    /// Register a user and return `(id, "Bearer <token>")`
    pub fn login(&self, username: &str) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        self.store.add_user(user_id, username);
        let token = self
            .keys
            .generate_access_token(user_id, username)
            .expect("sign token");
        (user_id, format!("Bearer {}", token))
    }
}

/// Build a multipart body with optional `caption` and `image` parts.
pub fn multipart_body(caption: Option<&str>, image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(caption) = caption {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\n{caption}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
}
