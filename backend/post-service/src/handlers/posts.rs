/// Feed handler
use crate::app::AppState;
use crate::error::Result;
use crate::services::{PageRequest, RequestOrigin};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

/// Raw query values; parsing is lenient so bad input falls back to defaults.
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// GET /posts?page&limit
pub async fn list_posts(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let request = PageRequest::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        state.feed.config(),
    );
    let origin = RequestOrigin::from_request(&req);

    let feed = state.feed.list_posts(request, &origin).await?;

    Ok(HttpResponse::Ok().json(feed))
}
