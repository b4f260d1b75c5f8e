/// Upload handlers - multipart post creation and stored image passthrough
use crate::app::AppState;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::AuthenticatedUser;
use crate::models::UploadResponse;
use crate::services::{RequestOrigin, UploadedImage};
use crate::storage::StorageError;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::stream::StreamExt;
use mime::Mime;

/// Caption text beyond this is rejected
const MAX_CAPTION_BYTES: usize = 64 * 1024;

/// POST /posts/upload (multipart: `image` file, `caption` text)
pub async fn upload_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let max_bytes = state.ingestion.max_bytes();
    let mut caption: Option<String> = None;
    let mut image: Option<UploadedImage> = None;

    while let Some(field) = payload.next().await {
        let mut field =
            field.map_err(|e| AppError::InvalidArgument(format!("Multipart error: {}", e)))?;

        let field_name = field.name().to_string();
        let file_name = field
            .content_disposition()
            .get_filename()
            .map(|name| name.to_string());

        match (field_name.as_str(), file_name) {
            ("image", Some(original_name)) => {
                let content_type = field.content_type().map(|m| m.to_string());
                let bytes = read_field(&mut field, max_bytes).await.map_err(|e| {
                    metrics::record_upload("rejected");
                    e
                })?;

                image = Some(UploadedImage {
                    original_name,
                    content_type,
                    bytes,
                });
            }
            ("caption", _) => {
                let bytes = read_field(&mut field, MAX_CAPTION_BYTES).await?;
                caption = Some(String::from_utf8(bytes).map_err(|_| {
                    AppError::InvalidArgument("Caption must be valid UTF-8".into())
                })?);
            }
            _ => {
                // Unknown fields are drained and ignored
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| {
                        AppError::InvalidArgument(format!("Multipart read error: {}", e))
                    })?;
                }
            }
        }
    }

    let origin = RequestOrigin::from_request(&req);
    let post = state
        .ingestion
        .create_post(user.user_id, &user.username, caption, image, &origin)
        .await?;

    Ok(HttpResponse::Created().json(UploadResponse {
        message: "Post created successfully".to_string(),
        post,
    }))
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();

    while let Some(chunk) = field.next().await {
        let chunk =
            chunk.map_err(|e| AppError::InvalidArgument(format!("Multipart read error: {}", e)))?;

        if data.len() + chunk.len() > limit {
            return Err(AppError::InvalidArgument(format!(
                "Field '{}' exceeds the {} byte limit",
                field.name(),
                limit
            )));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(data)
}

/// GET /uploads/{file}
pub async fn serve_upload(
    state: web::Data<AppState>,
    file: web::Path<String>,
) -> Result<HttpResponse> {
    let file = file.into_inner();

    match state.blobs.get(&file).await {
        Ok(Some(bytes)) => Ok(HttpResponse::Ok()
            .content_type(content_type_for(&file))
            .body(bytes)),
        Ok(None) | Err(StorageError::InvalidName(_)) => {
            Err(AppError::NotFound("File not found".to_string()))
        }
        Err(e) => Err(AppError::fetch("Error reading file", e)),
    }
}

/// Content type from the file extension; unknown types are served as bytes.
pub fn content_type_for(file_name: &str) -> Mime {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "png" => mime::IMAGE_PNG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        "webp" => "image/webp"
            .parse()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
