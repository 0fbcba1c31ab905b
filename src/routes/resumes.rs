/**
 * Resume Routes
 * Upload, CRUD, and the single-active-resume switch
 */
use std::path::PathBuf;

use axum::{
    extract::{Multipart, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::config::CONFIG;
use crate::db::models::{NewResume, UpdateResume};
use crate::routes::{bad_request, db_error, internal_error, not_found, require_store};

const RESUME_SUBDIR: &str = "resumes";
const MAX_RESUME_SIZE: usize = 10 * 1024 * 1024;
const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

fn file_extension(name: &str) -> String {
    name.rsplit('.').next().unwrap_or("").to_lowercase()
}

/// POST /api/resumes (admin, multipart) - upload a resume file.
///
/// Validation happens before anything touches the filesystem; a rejected
/// upload leaves no file behind.
pub async fn create_resume(mut multipart: Multipart) -> Result<Response, Response> {
    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => return Err(bad_request("No file provided")),
        Err(e) => {
            tracing::error!("Multipart error: {}", e);
            return Err(bad_request("Invalid multipart data"));
        }
    };

    let original_name = field.file_name().unwrap_or("resume").to_string();
    let extension = file_extension(&original_name);
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(bad_request(
            "Unsupported file type. Allowed: PDF, DOC, DOCX, TXT.",
        ));
    }

    let bytes = field.bytes().await.map_err(|e| {
        tracing::error!("Failed to read upload bytes: {}", e);
        bad_request("Failed to read file data")
    })?;

    if bytes.is_empty() {
        return Err(bad_request("Empty file"));
    }
    if bytes.len() > MAX_RESUME_SIZE {
        return Err(bad_request("File too large. Maximum size is 10MB."));
    }

    let store = require_store()?;

    let upload_path = PathBuf::from(&CONFIG.upload_dir).join(RESUME_SUBDIR);
    tokio::fs::create_dir_all(&upload_path).await.map_err(|e| {
        tracing::error!("Failed to create upload directory: {}", e);
        internal_error("Failed to initialize upload directory")
    })?;

    let filename = format!("{}.{}", Uuid::new_v4(), extension);
    let file_path = upload_path.join(&filename);
    tokio::fs::write(&file_path, &bytes).await.map_err(|e| {
        tracing::error!("Failed to write resume file: {}", e);
        internal_error("Failed to save file")
    })?;

    let input = NewResume {
        file_url: format!("/uploads/{RESUME_SUBDIR}/{filename}"),
        filename,
        original_name,
        parsed_content: None,
        is_active: false,
    };

    let resume = store.create_resume(input).await.map_err(|e| {
        db_error(e, "Failed to create resume")
    })?;

    tracing::info!("Resume uploaded: {} ({} bytes)", resume.filename, bytes.len());
    Ok((StatusCode::CREATED, Json(resume)).into_response())
}

/// GET /api/resumes (admin)
pub async fn list_resumes() -> Result<Response, Response> {
    let store = require_store()?;

    let resumes = store
        .get_all_resumes()
        .await
        .map_err(|e| db_error(e, "Failed to fetch resumes"))?;

    Ok(Json(resumes).into_response())
}

/// GET /api/resumes/active (public) - the one resume currently surfaced.
pub async fn get_active_resume() -> Result<Response, Response> {
    let store = require_store()?;

    match store
        .get_active_resume()
        .await
        .map_err(|e| db_error(e, "Failed to fetch active resume"))?
    {
        Some(resume) => Ok(Json(resume).into_response()),
        None => Err(not_found("Active resume")),
    }
}

/// GET /api/resumes/:id
pub async fn get_resume(Path(id): Path<String>) -> Result<Response, Response> {
    let store = require_store()?;

    match store
        .get_resume_by_id(&id)
        .await
        .map_err(|e| db_error(e, "Failed to fetch resume"))?
    {
        Some(resume) => Ok(Json(resume).into_response()),
        None => Err(not_found("Resume")),
    }
}

/// PUT /api/resumes/:id (admin) - partial metadata update.
pub async fn update_resume(
    Path(id): Path<String>,
    Json(payload): Json<UpdateResume>,
) -> Result<Response, Response> {
    let store = require_store()?;

    match store
        .update_resume(&id, payload)
        .await
        .map_err(|e| db_error(e, "Failed to update resume"))?
    {
        Some(resume) => Ok(Json(resume).into_response()),
        None => Err(not_found("Resume")),
    }
}

/// DELETE /api/resumes/:id (admin)
pub async fn delete_resume(Path(id): Path<String>) -> Result<Response, Response> {
    let store = require_store()?;

    let deleted = store
        .delete_resume(&id)
        .await
        .map_err(|e| db_error(e, "Failed to delete resume"))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(not_found("Resume"))
    }
}

/// POST /api/resumes/:id/set-active (admin)
///
/// Atomically makes this the only active resume; an unknown id changes no
/// activation state at all.
pub async fn set_active(Path(id): Path<String>) -> Result<Response, Response> {
    let store = require_store()?;

    match store
        .set_active_resume(&id)
        .await
        .map_err(|e| db_error(e, "Failed to set active resume"))?
    {
        Some(resume) => Ok(Json(resume).into_response()),
        None => Err(not_found("Resume")),
    }
}
