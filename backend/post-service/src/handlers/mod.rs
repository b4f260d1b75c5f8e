/// HTTP handlers for post-service
///
/// - Posts: paginated feed and image upload
/// - Comments: list and add
/// - Likes: toggle
/// - Uploads: serve stored images
/// - Health: liveness and readiness probes
pub mod comments;
pub mod health;
pub mod likes;
pub mod posts;
pub mod uploads;

pub use comments::{add_comment, list_comments};
pub use health::{health_summary, liveness_check, readiness_summary};
pub use likes::toggle_like;
pub use posts::list_posts;
pub use uploads::{serve_upload, upload_post};
