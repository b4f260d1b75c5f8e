use super::{PostStore, StoreError};
use crate::models::{Comment, Like, NewPost, Post};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

/// Row shape of the `posts` table; embedded collections are jsonb arrays.
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    post_id: String,
    user_id: Uuid,
    username: String,
    caption: Option<String>,
    image_url: String,
    likes: Json<Vec<Like>>,
    comments: Json<Vec<Comment>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            post_id: row.post_id,
            user_id: row.user_id,
            username: row.username,
            caption: row.caption,
            image_url: row.image_url,
            likes: row.likes.0,
            comments: row.comments.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Strictly increasing creation times for one batch, one microsecond apart
/// (the column's precision), so batch rows keep their insertion order.
fn batch_timestamps(base: DateTime<Utc>, len: usize) -> Vec<DateTime<Utc>> {
    (0..len as i64)
        .map(|i| base + Duration::microseconds(i))
        .collect()
}

/// PostgreSQL-backed post store
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert many posts with one multi-row statement. Used by the seeder.
    pub async fn insert_posts_batch(&self, posts: &[NewPost]) -> Result<u64, StoreError> {
        if posts.is_empty() {
            return Ok(0);
        }

        let timestamps = batch_timestamps(Utc::now(), posts.len());

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO posts (post_id, user_id, username, caption, image_url, created_at, updated_at) ",
        );
        builder.push_values(posts.iter().zip(timestamps), |mut row, (post, at)| {
            row.push_bind(&post.post_id)
                .push_bind(post.user_id)
                .push_bind(&post.username)
                .push_bind(&post.caption)
                .push_bind(&post.image_url)
                .push_bind(at)
                .push_bind(at);
        });

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Make sure a user row exists (seeding only; users are owned elsewhere).
    pub async fn ensure_user(&self, user_id: Uuid, username: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(username)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn count_posts(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn list_posts(&self, offset: i64, limit: i64) -> Result<Vec<Post>, StoreError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, post_id, user_id, username, caption, image_url, likes, comments,
                   created_at, updated_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, post_id, user_id, username, caption, image_url, likes, comments,
                   created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (post_id, user_id, username, caption, image_url, likes, comments)
            VALUES ($1, $2, $3, $4, $5, '[]'::jsonb, '[]'::jsonb)
            RETURNING id, post_id, user_id, username, caption, image_url, likes, comments,
                      created_at, updated_at
            "#,
        )
        .bind(&post.post_id)
        .bind(post.user_id)
        .bind(&post.username)
        .bind(&post.caption)
        .bind(&post.image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn toggle_like(&self, id: Uuid, like: Like) -> Result<Option<Vec<Like>>, StoreError> {
        // One statement: the row lock serialises concurrent toggles and the
        // CASE is re-evaluated against the latest row version.
        let likes: Option<Json<Vec<Like>>> = sqlx::query_scalar(
            r#"
            UPDATE posts
            SET likes = CASE
                    WHEN EXISTS (
                        SELECT 1 FROM jsonb_array_elements(likes) AS l(elem)
                        WHERE l.elem->>'userId' = $2
                    )
                    THEN COALESCE(
                        (SELECT jsonb_agg(l.elem ORDER BY l.ord)
                         FROM jsonb_array_elements(likes) WITH ORDINALITY AS l(elem, ord)
                         WHERE l.elem->>'userId' <> $2),
                        '[]'::jsonb
                    )
                    ELSE likes || jsonb_build_array($3::jsonb)
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING likes
            "#,
        )
        .bind(id)
        .bind(like.user_id.to_string())
        .bind(Json(&like))
        .fetch_optional(&self.pool)
        .await?;

        Ok(likes.map(|Json(likes)| likes))
    }

    async fn push_comment(&self, id: Uuid, comment: Comment) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET comments = comments || jsonb_build_array($2::jsonb),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, post_id, user_id, username, caption, image_url, likes, comments,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(Json(&comment))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    async fn find_usernames(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, StoreError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, username FROM users WHERE id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
