/// Application wiring: shared state and the route table
///
/// `configure` is used by both the server binary and the HTTP tests so they
/// exercise the same routes, middleware and extractor settings.
use crate::config::FeedConfig;
use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::handlers;
use crate::metrics;
use crate::middleware::{JwtAuthMiddleware, MetricsMiddleware};
use crate::services::{EngagementService, FeedService, IngestionService};
use crate::storage::BlobStore;
use actix_web::{web, HttpResponse};
use crypto_core::JwtKeys;
use std::sync::Arc;

/// JSON bodies are small (`{"text": ...}`)
const JSON_BODY_LIMIT: usize = 64 * 1024;

/// Process-wide state shared by all workers
pub struct AppState {
    pub store: Arc<dyn PostStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub jwt_keys: Arc<JwtKeys>,
    pub feed: FeedService,
    pub engagement: EngagementService,
    pub ingestion: IngestionService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn PostStore>,
        blobs: Arc<dyn BlobStore>,
        jwt_keys: Arc<JwtKeys>,
        feed_config: FeedConfig,
        upload_max_bytes: usize,
    ) -> Self {
        Self {
            feed: FeedService::new(store.clone(), feed_config),
            engagement: EngagementService::new(store.clone()),
            ingestion: IngestionService::new(store.clone(), blobs.clone(), upload_max_bytes),
            store,
            blobs,
            jwt_keys,
        }
    }
}

/// Body parse failures surface as `InvalidArgument`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, _req| {
            AppError::InvalidArgument(format!("Invalid request body: {}", err)).into()
        })
}

/// Register state and routes.
pub fn configure(cfg: &mut web::ServiceConfig, state: web::Data<AppState>) {
    let auth = JwtAuthMiddleware::new(state.jwt_keys.clone());

    cfg.app_data(state)
        .app_data(json_config())
        .route("/metrics", web::get().to(metrics::serve_metrics))
        .route("/health", web::get().to(handlers::health_summary))
        .route("/health/ready", web::get().to(handlers::readiness_summary))
        .route("/health/live", web::get().to(handlers::liveness_check))
        .service(
            web::scope("/posts")
                .wrap(MetricsMiddleware)
                .route("", web::get().to(handlers::list_posts))
                .service(
                    web::resource("/upload")
                        .wrap(auth.clone())
                        .route(web::post().to(handlers::upload_post)),
                )
                .route(
                    "/{post_id}/comments",
                    web::get().to(handlers::list_comments),
                )
                .service(
                    web::resource("/{post_id}/like")
                        .wrap(auth.clone())
                        .route(web::patch().to(handlers::toggle_like)),
                )
                .service(
                    web::resource("/{post_id}/comment")
                        .wrap(auth)
                        .route(web::post().to(handlers::add_comment)),
                ),
        )
        .service(
            web::scope("/uploads")
                .wrap(MetricsMiddleware)
                .route("/{file}", web::get().to(handlers::serve_upload)),
        )
        .default_service(web::to(route_not_found));
}

async fn route_not_found() -> Result<HttpResponse> {
    Err(AppError::NotFound("Route not found".to_string()))
}
