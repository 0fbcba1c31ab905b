/**
 * Blog Routes
 * CRUD API endpoints for blog posts
 */
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::db::models::{NewBlogPost, UpdateBlogPost};
use crate::routes::{db_error, not_found, required, require_store};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogPostRequest {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub read_time: Option<String>,
    pub published: Option<bool>,
}

/// Query parameters for GET /api/blog-posts. `search` is a case-insensitive
/// substring match over title, content, and excerpt; `category` is exact.
/// Empty values are treated as absent.
#[derive(Debug, Deserialize)]
pub struct BlogListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// POST /api/blog-posts (admin)
pub async fn create_post(
    Json(payload): Json<CreateBlogPostRequest>,
) -> Result<Response, Response> {
    let input = NewBlogPost {
        title: required(payload.title, "title")?,
        excerpt: required(payload.excerpt, "excerpt")?,
        content: required(payload.content, "content")?,
        category: required(payload.category, "category")?,
        image_url: payload.image_url,
        read_time: payload.read_time,
        published: payload.published,
    };

    let store = require_store()?;
    let post = store
        .create_blog_post(input)
        .await
        .map_err(|e| db_error(e, "Failed to create blog post"))?;

    Ok((StatusCode::CREATED, Json(post)).into_response())
}

/// GET /api/blog-posts
pub async fn list_posts(Query(query): Query<BlogListQuery>) -> Result<Response, Response> {
    let store = require_store()?;

    let search = query.search.as_deref().filter(|s| !s.is_empty());
    let category = query.category.as_deref().filter(|s| !s.is_empty());

    let posts = store
        .get_blog_posts_filtered(search, category)
        .await
        .map_err(|e| db_error(e, "Failed to fetch blog posts"))?;

    Ok(Json(posts).into_response())
}

/// GET /api/blog-posts/:id
pub async fn get_post(Path(id): Path<String>) -> Result<Response, Response> {
    let store = require_store()?;

    match store
        .get_blog_post_by_id(&id)
        .await
        .map_err(|e| db_error(e, "Failed to fetch blog post"))?
    {
        Some(post) => Ok(Json(post).into_response()),
        None => Err(not_found("Blog post")),
    }
}

/// PUT /api/blog-posts/:id (admin)
pub async fn update_post(
    Path(id): Path<String>,
    Json(payload): Json<UpdateBlogPost>,
) -> Result<Response, Response> {
    let store = require_store()?;

    match store
        .update_blog_post(&id, payload)
        .await
        .map_err(|e| db_error(e, "Failed to update blog post"))?
    {
        Some(post) => Ok(Json(post).into_response()),
        None => Err(not_found("Blog post")),
    }
}

/// DELETE /api/blog-posts/:id (admin)
pub async fn delete_post(Path(id): Path<String>) -> Result<Response, Response> {
    let store = require_store()?;

    let deleted = store
        .delete_blog_post(&id)
        .await
        .map_err(|e| db_error(e, "Failed to delete blog post"))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(not_found("Blog post"))
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

    #[tokio::test]
    async fn test_create_missing_content_is_bad_request() {
        let router = Router::new().route("/api/blog-posts", post(create_post));
        let body = serde_json::json!({
            "title": "T",
            "excerpt": "E",
            "category": "c"
        });
        let response = router
            .oneshot(
                Request::post("/api/blog-posts")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
