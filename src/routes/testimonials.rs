/**
 * Testimonial Routes
 * CRUD API endpoints for client testimonials
 */
use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::db::models::{NewTestimonial, UpdateTestimonial};
use crate::routes::{db_error, not_found, required, require_store};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestimonialRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub content: Option<String>,
    pub avatar_url: Option<String>,
    pub rating: Option<String>,
    pub featured: Option<bool>,
}

/// POST /api/testimonials (admin)
pub async fn create_testimonial(
    Json(payload): Json<CreateTestimonialRequest>,
) -> Result<Response, Response> {
    let input = NewTestimonial {
        name: required(payload.name, "name")?,
        role: required(payload.role, "role")?,
        company: required(payload.company, "company")?,
        content: required(payload.content, "content")?,
        avatar_url: payload.avatar_url,
        rating: payload.rating,
        featured: payload.featured,
    };

    let store = require_store()?;
    let testimonial = store
        .create_testimonial(input)
        .await
        .map_err(|e| db_error(e, "Failed to create testimonial"))?;

    Ok((StatusCode::CREATED, Json(testimonial)).into_response())
}

/// GET /api/testimonials
pub async fn list_testimonials() -> Result<Response, Response> {
    let store = require_store()?;

    let testimonials = store
        .get_all_testimonials()
        .await
        .map_err(|e| db_error(e, "Failed to fetch testimonials"))?;

    Ok(Json(testimonials).into_response())
}

/// GET /api/testimonials/:id
pub async fn get_testimonial(Path(id): Path<String>) -> Result<Response, Response> {
    let store = require_store()?;

    match store
        .get_testimonial_by_id(&id)
        .await
        .map_err(|e| db_error(e, "Failed to fetch testimonial"))?
    {
        Some(testimonial) => Ok(Json(testimonial).into_response()),
        None => Err(not_found("Testimonial")),
    }
}

/// PUT /api/testimonials/:id (admin)
pub async fn update_testimonial(
    Path(id): Path<String>,
    Json(payload): Json<UpdateTestimonial>,
) -> Result<Response, Response> {
    let store = require_store()?;

    match store
        .update_testimonial(&id, payload)
        .await
        .map_err(|e| db_error(e, "Failed to update testimonial"))?
    {
        Some(testimonial) => Ok(Json(testimonial).into_response()),
        None => Err(not_found("Testimonial")),
    }
}

/// DELETE /api/testimonials/:id (admin)
pub async fn delete_testimonial(Path(id): Path<String>) -> Result<Response, Response> {
    let store = require_store()?;

    let deleted = store
        .delete_testimonial(&id)
        .await
        .map_err(|e| db_error(e, "Failed to delete testimonial"))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(not_found("Testimonial"))
    }
}
