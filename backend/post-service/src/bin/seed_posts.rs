//! Bulk-insert synthetic posts for load and pagination testing.
//!
//! Environment:
//! - `DATABASE_URL` and the other `DATABASE_*` pool settings
//! - `SEED_POST_COUNT` (default 50000)
//! - `SEED_BATCH_SIZE` (default 500)
//! - `SEED_USERNAME` (default `seed-user`)

use anyhow::{anyhow, Context, Result};
use post_service::config::{parse_env_or_default, DatabaseConfig};
use post_service::db::{self, DbConfig, PgPostStore};
use post_service::models::NewPost;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const SEED_IMAGE_URL: &str = "https://images.unsplash.com/photo-1742330425089-1f91d18eaa4e?q=80&w=1470&auto=format&fit=crop&ixlib=rb-4.0.3&ixid=M3wxMjA3fDB8MHxwaG90by1wYWdlfHx8fGVufDB8fHx8fA%3D%3D";

/// Fixed id so repeated runs attach posts to the same user
const SEED_USER_ID: Uuid = Uuid::from_u128(0x5eed_0000_0000_4000_8000_0000_0000_0001);

fn generate_posts(start: usize, count: usize, user_id: Uuid, username: &str) -> Vec<NewPost> {
    (start..start + count)
        .map(|i| NewPost {
            post_id: Uuid::now_v7().to_string(),
            user_id,
            username: username.to_string(),
            caption: Some(format!("This is caption {}", i + 1)),
            image_url: SEED_IMAGE_URL.to_string(),
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let total: usize = parse_env_or_default("SEED_POST_COUNT", 50_000).map_err(|e| anyhow!(e))?;
    let batch_size: usize = parse_env_or_default("SEED_BATCH_SIZE", 500).map_err(|e| anyhow!(e))?;
    if batch_size == 0 {
        return Err(anyhow!("SEED_BATCH_SIZE must be at least 1"));
    }
    let username = std::env::var("SEED_USERNAME").unwrap_or_else(|_| "seed-user".to_string());

    let db_config = DatabaseConfig::from_env().map_err(|e| anyhow!(e))?;
    let pool = db::create_pool(DbConfig::from(&db_config))
        .await
        .context("Failed to connect to database")?;
    db::migrate(&pool).await.context("Failed to run migrations")?;

    let store = PgPostStore::new(pool.clone());
    store
        .ensure_user(SEED_USER_ID, &username)
        .await
        .context("Failed to create seed user")?;

    let batches = total.div_ceil(batch_size);
    let started = Instant::now();

    for (index, start) in (0..total).step_by(batch_size).enumerate() {
        let posts = generate_posts(start, batch_size.min(total - start), SEED_USER_ID, &username);

        let batch_started = Instant::now();
        let inserted = store
            .insert_posts_batch(&posts)
            .await
            .with_context(|| format!("Failed to insert batch {}", index + 1))?;

        info!(
            "Inserted batch {} of {} ({} posts) in {}ms",
            index + 1,
            batches,
            inserted,
            batch_started.elapsed().as_millis()
        );
    }

    info!(
        "Successfully inserted {} posts in {}ms",
        total,
        started.elapsed().as_millis()
    );

    pool.close().await;
    Ok(())
}
