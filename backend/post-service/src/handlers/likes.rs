/// Like handler
use crate::app::AppState;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use actix_web::{web, HttpResponse};

/// PATCH /posts/{post_id}/like
pub async fn toggle_like(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let likes = state.engagement.toggle_like(&post_id, user.user_id).await?;
    Ok(HttpResponse::Ok().json(likes))
}
