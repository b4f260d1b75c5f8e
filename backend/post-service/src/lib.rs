/// Post Service Library
///
/// Image posts for the Pixwall platform: paginated feed, likes, comments and
/// image uploads, backed by PostgreSQL with likes and comments embedded in
/// each post row.
///
/// # Modules
///
/// - `app`: shared state and route table
/// - `handlers`: HTTP request handlers
/// - `services`: feed, engagement and ingestion logic
/// - `db`: `PostStore` seam and its PostgreSQL implementation
/// - `storage`: `BlobStore` seam and the local-disk implementation
/// - `middleware`: JWT authentication and request metrics
/// - `models`: stored documents and response shapes
/// - `error`: error types and their HTTP mapping
/// - `config`: configuration management
/// - `metrics`: Prometheus collectors
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;

pub use app::{configure, AppState};
pub use config::Config;
pub use error::{AppError, Result};
