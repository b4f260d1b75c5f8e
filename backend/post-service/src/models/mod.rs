/// Data models for post-service
///
/// - `Post`: an image post with its likes and comments embedded
/// - `Like` / `Comment`: engagement entries stored inside the post document
/// - `NewPost`: insert payload produced by ingestion
/// - Feed views: posts with user references resolved to display names
///
/// Everything crossing the HTTP boundary is camelCase on the wire.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A like entry embedded in a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// A comment entry embedded in a post (append-only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub user_id: Uuid,
    /// Author display name at the time of commenting
    pub username: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Stored post document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Store identifier
    pub id: Uuid,
    /// Public, time-ordered post identifier
    pub post_id: String,
    pub user_id: Uuid,
    pub username: String,
    pub caption: Option<String>,
    pub image_url: String,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a freshly ingested post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub post_id: String,
    pub user_id: Uuid,
    pub username: String,
    pub caption: Option<String>,
    pub image_url: String,
}

// ============================================================================
// Feed views
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeView {
    pub user_id: Uuid,
    /// `None` when the user no longer exists
    pub username: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub user_id: Uuid,
    pub username: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// A post as returned by the feed: names resolved, image URL absolute
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    pub id: Uuid,
    pub post_id: String,
    pub user_id: Uuid,
    pub username: String,
    pub caption: Option<String>,
    pub image_url: String,
    pub likes: Vec<LikeView>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_posts: i64,
    pub page_size: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: i64, page_size: i64, total_posts: i64) -> Self {
        let total_pages = if total_posts <= 0 {
            0
        } else {
            (total_posts + page_size - 1) / page_size
        };

        Self {
            current_page: page,
            total_pages,
            total_posts,
            page_size,
            has_next_page: page.saturating_mul(page_size) < total_posts,
            has_prev_page: page > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedResponse {
    pub posts: Vec<FeedPost>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentSummary {
    pub text: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsResponse {
    pub comments: Vec<CommentSummary>,
    pub comment_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikesResponse {
    pub likes_count: usize,
    pub likes: Vec<Like>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub post: Post,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_middle_page() {
        let p = Pagination::new(2, 10, 35);
        assert_eq!(p.total_pages, 4);
        assert!(p.has_next_page);
        assert!(p.has_prev_page);
    }

    #[test]
    fn test_pagination_exact_last_page() {
        let p = Pagination::new(3, 10, 30);
        assert_eq!(p.total_pages, 3);
        assert!(!p.has_next_page);
    }

    #[test]
    fn test_pagination_empty_store() {
        let p = Pagination::new(1, 10, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
        assert!(!p.has_prev_page);
    }

    #[test]
    fn test_pagination_flags_match_window_arithmetic() {
        for total in 0..40 {
            for page_size in 1..8 {
                for page in 1..10 {
                    let p = Pagination::new(page, page_size, total);
                    assert_eq!(p.has_next_page, page * page_size < total);
                    assert_eq!(p.has_prev_page, page > 1);
                    assert!(p.total_pages * page_size >= total);
                }
            }
        }
    }

    #[test]
    fn test_pagination_serializes_camel_case() {
        let json = serde_json::to_value(Pagination::new(1, 10, 11)).unwrap();
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["totalPosts"], 11);
        assert_eq!(json["pageSize"], 10);
        assert_eq!(json["hasNextPage"], true);
        assert_eq!(json["hasPrevPage"], false);
    }

    #[test]
    fn test_pagination_huge_page_has_no_next() {
        let p = Pagination::new(i64::MAX, 10, 25);
        assert!(!p.has_next_page);
        assert!(p.has_prev_page);
        assert_eq!(p.total_pages, 3);
    }

    #[test]
    fn test_like_wire_format() {
        let like = Like {
            user_id: Uuid::nil(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&like).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("timestamp").is_some());
    }
}
