//! Prometheus metrics for post-service.
//!
//! Collectors live in the default registry and are rendered by `/metrics`.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// HTTP request latency by method, matched route and status.
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration segmented by method, path and status",
        &["method", "path", "status"]
    )
    .expect("failed to register http_request_duration_seconds");

    /// Engagement mutations (like, unlike, comment).
    pub static ref POST_ENGAGEMENT_TOTAL: IntCounterVec = register_int_counter_vec!(
        "post_engagement_total",
        "Post engagement mutations segmented by action",
        &["action"]
    )
    .expect("failed to register post_engagement_total");

    /// Upload attempts (success, rejected, error).
    pub static ref POST_UPLOADS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "post_uploads_total",
        "Image post uploads segmented by outcome",
        &["result"]
    )
    .expect("failed to register post_uploads_total");
}

pub fn record_engagement(action: &str) {
    POST_ENGAGEMENT_TOTAL.with_label_values(&[action]).inc();
}

pub fn record_upload(result: &str) {
    POST_UPLOADS_TOTAL.with_label_values(&[result]).inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
