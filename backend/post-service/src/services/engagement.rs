/// Engagement service - like toggling and comments
use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{Comment, Like, LikesResponse, Post};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct EngagementService {
    store: Arc<dyn PostStore>,
}

impl EngagementService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    /// Add the caller's like, or remove it if already present.
    pub async fn toggle_like(&self, post_id: &str, user_id: Uuid) -> Result<LikesResponse> {
        let id = Uuid::parse_str(post_id)
            .map_err(|_| AppError::InvalidArgument("Invalid post ID format".to_string()))?;

        let like = Like {
            user_id,
            timestamp: Utc::now(),
        };

        let likes = self
            .store
            .toggle_like(id, like)
            .await
            .map_err(|e| AppError::persist("Error updating like", e))?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        let liked = likes.iter().any(|l| l.user_id == user_id);
        metrics::record_engagement(if liked { "like" } else { "unlike" });
        info!(post_id = %id, user_id = %user_id, liked, likes = likes.len(), "Toggled like");

        Ok(LikesResponse {
            likes_count: likes.len(),
            likes,
        })
    }

    /// Append a comment and return the post as it is after the append.
    pub async fn add_comment(
        &self,
        post_id: &str,
        user_id: Uuid,
        username: &str,
        text: Option<&str>,
    ) -> Result<Post> {
        let text = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::InvalidArgument("Comment text is required".to_string()))?;

        // A malformed id cannot name any stored post
        let id = Uuid::parse_str(post_id)
            .map_err(|_| AppError::NotFound("Post not found".to_string()))?;

        let comment = Comment {
            user_id,
            username: username.to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
        };

        let post = self
            .store
            .push_comment(id, comment)
            .await
            .map_err(|e| AppError::persist("Error adding comment", e))?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        metrics::record_engagement("comment");
        info!(
            post_id = %id,
            user_id = %user_id,
            comments = post.comments.len(),
            "Comment added"
        );

        Ok(post)
    }
}
