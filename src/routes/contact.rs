/**
 * Contact Submission Routes
 * Public intake plus admin-only review; submissions are immutable once made
 */
use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::db::models::NewContactSubmission;
use crate::notify;
use crate::routes::{bad_request, db_error, not_found, required, require_store};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub project_type: Option<String>,
    pub message: Option<String>,
}

/// POST /api/contact-submissions (public)
pub async fn create_submission(
    Json(payload): Json<CreateContactRequest>,
) -> Result<Response, Response> {
    let email = required(payload.email, "email")?;
    if !email.contains('@') {
        return Err(bad_request("Invalid email format"));
    }

    let input = NewContactSubmission {
        first_name: required(payload.first_name, "firstName")?,
        last_name: required(payload.last_name, "lastName")?,
        email,
        company: payload.company,
        project_type: payload.project_type,
        message: required(payload.message, "message")?,
    };

    let store = require_store()?;
    let submission = store
        .create_contact_submission(input)
        .await
        .map_err(|e| db_error(e, "Failed to create contact submission"))?;

    // Fire-and-forget; delivery problems never reach this response.
    notify::contact_submitted(&submission);

    Ok((StatusCode::CREATED, Json(submission)).into_response())
}

/// GET /api/contact-submissions (admin)
pub async fn list_submissions() -> Result<Response, Response> {
    let store = require_store()?;

    let submissions = store
        .get_all_contact_submissions()
        .await
        .map_err(|e| db_error(e, "Failed to fetch contact submissions"))?;

    Ok(Json(submissions).into_response())
}

/// GET /api/contact-submissions/:id (admin)
pub async fn get_submission(Path(id): Path<String>) -> Result<Response, Response> {
    let store = require_store()?;

    match store
        .get_contact_submission_by_id(&id)
        .await
        .map_err(|e| db_error(e, "Failed to fetch contact submission"))?
    {
        Some(submission) => Ok(Json(submission).into_response()),
        None => Err(not_found("Contact submission")),
    }
}

/// DELETE /api/contact-submissions/:id (admin)
pub async fn delete_submission(Path(id): Path<String>) -> Result<Response, Response> {
    let store = require_store()?;

    let deleted = store
        .delete_contact_submission(&id)
        .await
        .map_err(|e| db_error(e, "Failed to delete contact submission"))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(not_found("Contact submission"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    async fn submit(body: serde_json::Value) -> StatusCode {
        let router = Router::new().route("/api/contact-submissions", post(create_submission));
        let response = router
            .oneshot(
                Request::post("/api/contact-submissions")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_missing_message_is_bad_request() {
        let status = submit(serde_json::json!({
            "firstName": "Jane",
            "lastName": "Doe",
            "email": "jane@example.com"
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_email_is_bad_request() {
        let status = submit(serde_json::json!({
            "firstName": "Jane",
            "lastName": "Doe",
            "email": "not-an-email",
            "message": "Hi"
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
