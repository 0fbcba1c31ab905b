/**
 * Project Routes
 * CRUD API endpoints for portfolio projects
 */
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::db::models::{NewProject, UpdateProject};
use crate::routes::{bad_request, db_error, not_found, required, require_store};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub category: Option<String>,
    pub tools: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub case_study_url: Option<String>,
    pub demo_url: Option<String>,
    pub featured: Option<bool>,
    pub challenge: Option<String>,
    pub solution: Option<String>,
    pub process: Option<String>,
    pub results: Option<String>,
}

/// Query parameters for GET /api/projects; both filters are exact matches.
/// Empty values are treated as absent.
#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub category: Option<String>,
    pub featured: Option<String>,
}

/// POST /api/projects (admin)
pub async fn create_project(
    Json(payload): Json<CreateProjectRequest>,
) -> Result<Response, Response> {
    let input = NewProject {
        title: required(payload.title, "title")?,
        description: required(payload.description, "description")?,
        category: required(payload.category, "category")?,
        long_description: payload.long_description,
        tools: payload.tools,
        image_url: payload.image_url,
        case_study_url: payload.case_study_url,
        demo_url: payload.demo_url,
        featured: payload.featured,
        challenge: payload.challenge,
        solution: payload.solution,
        process: payload.process,
        results: payload.results,
    };

    let store = require_store()?;
    let project = store
        .create_project(input)
        .await
        .map_err(|e| db_error(e, "Failed to create project"))?;

    Ok((StatusCode::CREATED, Json(project)).into_response())
}

/// GET /api/projects
pub async fn list_projects(
    Query(query): Query<ProjectListQuery>,
) -> Result<Response, Response> {
    let store = require_store()?;

    let category = query.category.as_deref().filter(|s| !s.is_empty());
    let featured = query
        .featured
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| s == "true");

    let projects = store
        .get_projects_filtered(category, featured)
        .await
        .map_err(|e| db_error(e, "Failed to fetch projects"))?;

    Ok(Json(projects).into_response())
}

/// GET /api/projects/:id
pub async fn get_project(Path(id): Path<String>) -> Result<Response, Response> {
    let store = require_store()?;

    match store
        .get_project_by_id(&id)
        .await
        .map_err(|e| db_error(e, "Failed to fetch project"))?
    {
        Some(project) => Ok(Json(project).into_response()),
        None => Err(not_found("Project")),
    }
}

/// PUT /api/projects/:id (admin)
pub async fn update_project(
    Path(id): Path<String>,
    Json(payload): Json<UpdateProject>,
) -> Result<Response, Response> {
    if payload.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(bad_request("title must not be empty"));
    }

    let store = require_store()?;
    match store
        .update_project(&id, payload)
        .await
        .map_err(|e| db_error(e, "Failed to update project"))?
    {
        Some(project) => Ok(Json(project).into_response()),
        None => Err(not_found("Project")),
    }
}

/// DELETE /api/projects/:id (admin)
pub async fn delete_project(Path(id): Path<String>) -> Result<Response, Response> {
    let store = require_store()?;

    let deleted = store
        .delete_project(&id)
        .await
        .map_err(|e| db_error(e, "Failed to delete project"))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(not_found("Project"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn project_router() -> Router {
        Router::new()
            .route("/api/projects", get(list_projects).post(create_project))
            .route("/api/projects/{id}", get(get_project))
    }

    async fn post_json(router: Router, uri: &str, body: serde_json::Value) -> StatusCode {
        let response = router
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_create_missing_required_field_is_bad_request() {
        let status = post_json(
            project_router(),
            "/api/projects",
            serde_json::json!({ "description": "d", "category": "c" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_blank_title_is_bad_request() {
        let status = post_json(
            project_router(),
            "/api/projects",
            serde_json::json!({ "title": "  ", "description": "d", "category": "c" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_without_database_is_unavailable() {
        let status = post_json(
            project_router(),
            "/api/projects",
            serde_json::json!({ "title": "A", "description": "d", "category": "c" }),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
