/// Database access layer
///
/// This module provides:
/// - `PostStore`: the persistence seam the services depend on
/// - `PgPostStore`: PostgreSQL implementation (posts as jsonb documents)
/// - Connection pool creation and embedded migrations
pub mod pg_post_store;

pub use pg_post_store::PgPostStore;

use crate::models::{Comment, Like, NewPost, Post};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Injected or backend-specific failure outside sqlx
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence operations over post documents.
///
/// Mutations are single statements so the database serialises concurrent
/// writers on the same post.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Cheap round trip used by readiness probes
    async fn ping(&self) -> Result<(), StoreError>;

    async fn count_posts(&self) -> Result<i64, StoreError>;

    /// Posts ordered newest first
    async fn list_posts(&self, offset: i64, limit: i64) -> Result<Vec<Post>, StoreError>;

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError>;

    /// Remove the user's like if present, otherwise append `like`.
    /// Returns the resulting like collection, or `None` if the post is missing.
    async fn toggle_like(&self, id: Uuid, like: Like) -> Result<Option<Vec<Like>>, StoreError>;

    /// Append a comment. Returns the updated post, or `None` if it is missing.
    async fn push_comment(&self, id: Uuid, comment: Comment) -> Result<Option<Post>, StoreError>;

    /// Display names for the given users; unknown ids are absent from the map.
    async fn find_usernames(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, StoreError>;
}

/// Database connection pool configuration
#[derive(Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Connection acquisition timeout (get connection from pool)
    pub acquire_timeout_secs: u64,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

impl From<&crate::config::DatabaseConfig> for DbConfig {
    fn from(cfg: &crate::config::DatabaseConfig) -> Self {
        Self {
            database_url: cfg.url.clone(),
            max_connections: cfg.max_connections,
            min_connections: cfg.min_connections,
            acquire_timeout_secs: cfg.acquire_timeout_secs,
        }
    }
}

/// Create a PostgreSQL connection pool and verify it with a round trip.
pub async fn create_pool(config: DbConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        "Database Pool Configuration: max_connections={}, min_connections={}, acquire_timeout={}s",
        config.max_connections, config.min_connections, config.acquire_timeout_secs
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .test_before_acquire(true)
        .connect(&config.database_url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    info!("Database pool created and verified successfully");

    Ok(pool)
}

/// Apply embedded migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}
