/**
 * Routes Module
 * API route handlers
 */
pub mod auth;
pub mod blog;
pub mod contact;
pub mod feeds;
pub mod health;
pub mod projects;
pub mod resumes;
pub mod testimonials;
pub mod upload;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::db::Store;

/// Error body shared by all handlers.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }
}

/// Success body for operations with nothing else to return.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

pub(crate) fn bad_request(error: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(error))).into_response()
}

pub(crate) fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(format!("{what} not found"))),
    )
        .into_response()
}

pub(crate) fn conflict(error: &str) -> Response {
    (StatusCode::CONFLICT, Json(ErrorResponse::new(error))).into_response()
}

/// Generic 500; the detailed cause stays in the server logs.
pub(crate) fn internal_error(error: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(error)),
    )
        .into_response()
}

pub(crate) fn db_unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse::new("Database not available")),
    )
        .into_response()
}

/// Store handle for handlers, or a ready-made 503.
pub(crate) fn require_store() -> Result<Store, Response> {
    crate::db::store().ok_or_else(db_unavailable)
}

/// Log a store failure and collapse it to a generic 500.
pub(crate) fn db_error(err: sqlx::Error, error: &str) -> Response {
    tracing::error!("Database error: {}: {}", error, err);
    internal_error(error)
}

/// Pull a required field out of a request payload, trimming nothing but
/// rejecting missing or blank values with a 400.
pub(crate) fn required(value: Option<String>, name: &str) -> Result<String, Response> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(bad_request(&format!("{name} is required"))),
    }
}
