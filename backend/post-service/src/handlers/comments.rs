/// Comment handlers
use crate::app::AppState;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

/// `text` stays untyped so a non-string value is a validation error,
/// not a body parse error.
#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub text: Option<serde_json::Value>,
}

/// GET /posts/{post_id}/comments
pub async fn list_comments(
    state: web::Data<AppState>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let comments = state.feed.list_comments(&post_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// POST /posts/{post_id}/comment
pub async fn add_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    post_id: web::Path<String>,
    body: web::Json<AddCommentRequest>,
) -> Result<HttpResponse> {
    let text = body.text.as_ref().and_then(|v| v.as_str());

    let post = state
        .engagement
        .add_comment(&post_id, user.user_id, &user.username, text)
        .await?;

    Ok(HttpResponse::Ok().json(post))
}
