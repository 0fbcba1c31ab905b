/**
 * Upload Routes
 * Blog image intake with content sniffing
 */
use std::path::PathBuf;

use axum::{
    extract::Multipart,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::config::CONFIG;
use crate::routes::{bad_request, internal_error};

const BLOG_IMAGE_SUBDIR: &str = "blog-images";
const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
    pub original_name: String,
    pub size: usize,
    pub mime_type: String,
}

/// Sniff the image type from leading bytes. The declared content type and
/// filename extension are advisory; only sniffed content is trusted.
fn sniff_image_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < 4 {
        return None;
    }
    match bytes {
        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        // PNG: 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        // GIF: 47 49 46 38
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        // WebP: RIFF....WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    }
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// POST /api/upload/blog-image (admin, multipart)
///
/// All validation runs before the file is written; a rejected upload never
/// reaches the filesystem.
pub async fn upload_blog_image(mut multipart: Multipart) -> Result<Response, Response> {
    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => return Err(bad_request("No image file uploaded")),
        Err(e) => {
            tracing::error!("Multipart error: {}", e);
            return Err(bad_request("Invalid multipart data"));
        }
    };

    let original_name = field.file_name().unwrap_or("image").to_string();
    let declared_ext = original_name
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&declared_ext.as_str()) {
        return Err(bad_request(
            "Unsupported file type. Allowed: JPEG, PNG, WebP, GIF.",
        ));
    }

    let bytes = field.bytes().await.map_err(|e| {
        tracing::error!("Failed to read upload bytes: {}", e);
        bad_request("Failed to read file data")
    })?;

    if bytes.is_empty() {
        return Err(bad_request("Empty file"));
    }
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(bad_request("File too large. Maximum size is 5MB."));
    }

    let Some(mime_type) = sniff_image_type(&bytes) else {
        return Err(bad_request(
            "File content does not match an allowed image type.",
        ));
    };

    let upload_path = PathBuf::from(&CONFIG.upload_dir).join(BLOG_IMAGE_SUBDIR);
    tokio::fs::create_dir_all(&upload_path).await.map_err(|e| {
        tracing::error!("Failed to create upload directory: {}", e);
        internal_error("Failed to initialize upload directory")
    })?;

    let filename = format!("{}.{}", Uuid::new_v4(), extension_for(mime_type));
    let file_path = upload_path.join(&filename);
    tokio::fs::write(&file_path, &bytes).await.map_err(|e| {
        tracing::error!("Failed to write upload file: {}", e);
        internal_error("Failed to save file")
    })?;

    tracing::info!("Blog image uploaded: {} ({} bytes)", filename, bytes.len());

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: format!("/uploads/{BLOG_IMAGE_SUBDIR}/{filename}"),
            filename,
            original_name,
            size: bytes.len(),
            mime_type: mime_type.to_string(),
        }),
    )
        .into_response())
}
