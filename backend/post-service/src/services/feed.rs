/// Feed service - paginated post listing and comment listing
use super::RequestOrigin;
use crate::config::FeedConfig;
use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::models::{
    CommentSummary, CommentView, CommentsResponse, FeedPost, FeedResponse, LikeView, Pagination,
    Post,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Normalised page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Parse raw `page`/`limit` query values. Absent, non-numeric or
    /// non-positive values fall back to the defaults; the size is clamped.
    pub fn parse(page: Option<&str>, limit: Option<&str>, config: &FeedConfig) -> Self {
        let page = parse_positive(page).unwrap_or(1);
        let page_size = parse_positive(limit)
            .unwrap_or(config.default_page_size)
            .min(config.max_page_size);

        Self { page, page_size }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 1)
}

/// Absolute URLs pass through; stored paths become `/uploads/<last segment>`.
pub fn resolve_image_url(stored: &str, origin: &RequestOrigin) -> String {
    if stored.starts_with("http://") || stored.starts_with("https://") {
        return stored.to_string();
    }

    let file_name = stored.rsplit('/').next().unwrap_or(stored);
    origin.upload_url(file_name)
}

pub struct FeedService {
    store: Arc<dyn PostStore>,
    config: FeedConfig,
}

impl FeedService {
    pub fn new(store: Arc<dyn PostStore>, config: FeedConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Newest-first page of posts with user references resolved.
    pub async fn list_posts(
        &self,
        request: PageRequest,
        origin: &RequestOrigin,
    ) -> Result<FeedResponse> {
        const FAILURE: &str = "Error fetching posts";

        let total = self
            .store
            .count_posts()
            .await
            .map_err(|e| AppError::fetch(FAILURE, e))?;

        let posts = if request.offset() < total {
            self.store
                .list_posts(request.offset(), request.page_size)
                .await
                .map_err(|e| AppError::fetch(FAILURE, e))?
        } else {
            Vec::new()
        };

        let user_ids: Vec<Uuid> = posts
            .iter()
            .flat_map(|post| {
                post.likes
                    .iter()
                    .map(|l| l.user_id)
                    .chain(post.comments.iter().map(|c| c.user_id))
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let names = self
            .store
            .find_usernames(&user_ids)
            .await
            .map_err(|e| AppError::fetch(FAILURE, e))?;

        debug!(
            page = request.page,
            page_size = request.page_size,
            total,
            returned = posts.len(),
            "Listed feed page"
        );

        Ok(FeedResponse {
            posts: posts
                .into_iter()
                .map(|post| to_feed_post(post, &names, origin))
                .collect(),
            pagination: Pagination::new(request.page, request.page_size, total),
        })
    }

    /// Comments on a post as `{text, username}` pairs.
    pub async fn list_comments(&self, post_id: &str) -> Result<CommentsResponse> {
        const FAILURE: &str = "Error fetching comments";

        // A malformed id cannot name any stored post
        let id = Uuid::parse_str(post_id)
            .map_err(|_| AppError::NotFound("Post not found".to_string()))?;

        let post = self
            .store
            .find_post(id)
            .await
            .map_err(|e| AppError::fetch(FAILURE, e))?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        let user_ids: Vec<Uuid> = post
            .comments
            .iter()
            .map(|c| c.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let names = self
            .store
            .find_usernames(&user_ids)
            .await
            .map_err(|e| AppError::fetch(FAILURE, e))?;

        let comment_count = post.comments.len();
        let comments = post
            .comments
            .into_iter()
            .map(|c| CommentSummary {
                username: names.get(&c.user_id).cloned().unwrap_or(c.username),
                text: c.text,
            })
            .collect();

        Ok(CommentsResponse {
            comments,
            comment_count,
        })
    }
}

fn to_feed_post(post: Post, names: &HashMap<Uuid, String>, origin: &RequestOrigin) -> FeedPost {
    FeedPost {
        id: post.id,
        post_id: post.post_id,
        user_id: post.user_id,
        username: post.username,
        caption: post.caption,
        image_url: resolve_image_url(&post.image_url, origin),
        likes: post
            .likes
            .into_iter()
            .map(|l| LikeView {
                username: names.get(&l.user_id).cloned(),
                user_id: l.user_id,
                timestamp: l.timestamp,
            })
            .collect(),
        comments: post
            .comments
            .into_iter()
            .map(|c| CommentView {
                username: names.get(&c.user_id).cloned().unwrap_or(c.username),
                user_id: c.user_id,
                text: c.text,
                timestamp: c.timestamp,
            })
            .collect(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}
