//! In-memory PostStore for HTTP tests
//!
//! Mirrors the PostgreSQL store's observable behaviour (newest-first order,
//! atomic toggle, append-only comments) without a database. Failures can be
//! switched on to exercise the 500 paths.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use post_service::db::{PostStore, StoreError};
use post_service::models::{Comment, Like, NewPost, Post};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    posts: Vec<Post>,
    users: HashMap<Uuid, String>,
    last_created_at: Option<DateTime<Utc>>,
    failing: bool,
    username_lookups: usize,
}

#[derive(Clone, Default)]
pub struct MemoryPostStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user in the simulated directory
    pub fn add_user(&self, id: Uuid, username: &str) {
        self.inner
            .lock()
            .unwrap()
            .users
            .insert(id, username.to_string());
    }

    /// Remove a user from the directory (their likes and comments remain)
    pub fn remove_user(&self, id: Uuid) {
        self.inner.lock().unwrap().users.remove(&id);
    }

    /// Insert a post directly, bypassing ingestion
    pub fn seed_post(&self, user_id: Uuid, username: &str, image_url: &str) -> Post {
        let mut inner = self.inner.lock().unwrap();
        let caption = format!("seeded {}", inner.posts.len() + 1);
        let post = build_post(
            &mut inner,
            NewPost {
                post_id: Uuid::now_v7().to_string(),
                user_id,
                username: username.to_string(),
                caption: Some(caption),
                image_url: image_url.to_string(),
            },
        );
        inner.posts.push(post.clone());
        post
    }

    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().unwrap().failing = failing;
    }

    /// Number of `find_usernames` calls (batched lookup verification)
    pub fn username_lookups(&self) -> usize {
        self.inner.lock().unwrap().username_lookups
    }

    pub fn get(&self, id: Uuid) -> Option<Post> {
        self.inner
            .lock()
            .unwrap()
            .posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().posts.len()
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.failing {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        Ok(inner)
    }
}

/// Strictly increasing creation times keep the order deterministic
fn build_post(inner: &mut Inner, new_post: NewPost) -> Post {
    let mut now = Utc::now();
    if let Some(last) = inner.last_created_at {
        if now <= last {
            now = last + Duration::microseconds(1);
        }
    }
    inner.last_created_at = Some(now);

    Post {
        id: Uuid::new_v4(),
        post_id: new_post.post_id,
        user_id: new_post.user_id,
        username: new_post.username,
        caption: new_post.caption,
        image_url: new_post.image_url,
        likes: Vec::new(),
        comments: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.guard().map(|_| ())
    }

    async fn count_posts(&self) -> Result<i64, StoreError> {
        Ok(self.guard()?.posts.len() as i64)
    }

    async fn list_posts(&self, offset: i64, limit: i64) -> Result<Vec<Post>, StoreError> {
        let inner = self.guard()?;
        let mut posts = inner.posts.clone();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(posts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(self.guard()?.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let mut inner = self.guard()?;
        let post = build_post(&mut inner, post);
        inner.posts.push(post.clone());
        Ok(post)
    }

    async fn toggle_like(&self, id: Uuid, like: Like) -> Result<Option<Vec<Like>>, StoreError> {
        let mut inner = self.guard()?;
        let Some(post) = inner.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        if post.likes.iter().any(|l| l.user_id == like.user_id) {
            post.likes.retain(|l| l.user_id != like.user_id);
        } else {
            post.likes.push(like);
        }
        post.updated_at = Utc::now();

        Ok(Some(post.likes.clone()))
    }

    async fn push_comment(&self, id: Uuid, comment: Comment) -> Result<Option<Post>, StoreError> {
        let mut inner = self.guard()?;
        let Some(post) = inner.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        post.comments.push(comment);
        post.updated_at = Utc::now();

        Ok(Some(post.clone()))
    }

    async fn find_usernames(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, StoreError> {
        let mut inner = self.guard()?;
        inner.username_lookups += 1;

        Ok(user_ids
            .iter()
            .filter_map(|id| inner.users.get(id).map(|name| (*id, name.clone())))
            .collect())
    }
}
