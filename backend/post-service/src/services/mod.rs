/// Business logic layer for post-service
///
/// - Feed service: paginated feed, comment listing
/// - Engagement service: like toggle, comment append
/// - Ingestion service: image post creation
///
/// Services depend on the `PostStore` and `BlobStore` seams only.
pub mod engagement;
pub mod feed;
pub mod ingestion;

pub use engagement::EngagementService;
pub use feed::{resolve_image_url, FeedService, PageRequest};
pub use ingestion::{IngestionService, UploadedImage};

use actix_web::HttpRequest;

/// Scheme and host the client used to reach us; absolute URLs are built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub scheme: String,
    pub host: String,
}

impl RequestOrigin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    pub fn from_request(req: &HttpRequest) -> Self {
        let info = req.connection_info();
        Self::new(info.scheme(), info.host())
    }

    /// `<scheme>://<host>/uploads/<file_name>`
    pub fn upload_url(&self, file_name: &str) -> String {
        format!("{}://{}/uploads/{}", self.scheme, self.host, file_name)
    }
}
