//! Request gates for protected routes.
//!
//! Per-request outcomes: no token at all is 401; a token that fails
//! signature, expiry, or version checks is 403; a valid token without the
//! required role is 403. On success the resolved identity rides along as a
//! request extension.

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::db;
use crate::routes::ErrorResponse;

/// Identity attached to requests that pass a gate.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

async fn resolve_identity(headers: &HeaderMap) -> Result<AuthUser, Response> {
    let Some(token) = bearer_token(headers) else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("Access token required")),
        )
            .into_response());
    };

    let Some(claims) = super::verify_token(&token) else {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Invalid or expired token")),
        )
            .into_response());
    };

    // Revocation check: a token issued under an older version, or for a
    // user row that no longer exists, is dead even though its signature
    // still verifies.
    if let Some(store) = db::store() {
        match store.get_user_by_id(&claims.sub).await {
            Ok(Some(user)) if user.token_version != claims.ver => {
                return Err((
                    StatusCode::FORBIDDEN,
                    Json(ErrorResponse::new("Token has been revoked")),
                )
                    .into_response());
            }
            Ok(None) => {
                return Err((
                    StatusCode::FORBIDDEN,
                    Json(ErrorResponse::new("Unknown token subject")),
                )
                    .into_response());
            }
            Ok(Some(_)) => {}
            Err(e) => {
                tracing::error!("Database error during token revocation check: {}", e);
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Authentication service unavailable")),
                )
                    .into_response());
            }
        }
    }

    Ok(AuthUser {
        id: claims.sub,
        username: claims.username,
        role: claims.role,
    })
}

/// Gate: any valid token.
pub async fn require_auth(mut request: Request, next: Next) -> Response {
    match resolve_identity(request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(response) => response,
    }
}

/// Gate: valid token with the admin role.
pub async fn require_admin(mut request: Request, next: Next) -> Response {
    match resolve_identity(request.headers()).await {
        Ok(user) if user.is_admin() => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(_) => (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Admin access required")),
        )
            .into_response(),
        Err(response) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::issue_token;
    use crate::db::models::User;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::routing::get;
    use axum::{middleware, Extension, Router};
    use chrono::Utc;
    use tower::ServiceExt;

    async fn whoami(Extension(user): Extension<AuthUser>) -> String {
        user.username
    }

    fn admin_gated_router() -> Router {
        Router::new()
            .route("/admin-only", get(whoami))
            .route_layer(middleware::from_fn(require_admin))
    }

    fn token_for(role: &str) -> String {
        let user = User {
            id: "u-1".to_string(),
            username: "tester".to_string(),
            email: "tester@example.com".to_string(),
            password_hash: String::new(),
            role: role.to_string(),
            token_version: 0,
            created_at: Utc::now(),
            last_login_at: None,
        };
        issue_token(&user).unwrap()
    }

    async fn get_with_auth(router: Router, auth: Option<&str>) -> StatusCode {
        let mut builder = HttpRequest::get("/admin-only");
        if let Some(value) = auth {
            builder = builder.header("authorization", value);
        }
        let response = router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let status = get_with_auth(admin_gated_router(), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_token_is_forbidden() {
        let status =
            get_with_auth(admin_gated_router(), Some("Bearer not.a.real.token")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_non_admin_token_is_forbidden_on_admin_route() {
        let token = token_for("user");
        let status =
            get_with_auth(admin_gated_router(), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_token_passes_and_identity_is_attached() {
        let token = token_for("admin");
        let router = admin_gated_router();
        let response = router
            .oneshot(
                HttpRequest::get("/admin-only")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"tester");
    }

    #[tokio::test]
    async fn test_any_valid_token_passes_require_auth() {
        let router = Router::new()
            .route("/me", get(whoami))
            .route_layer(middleware::from_fn(require_auth));
        let token = token_for("user");
        let response = router
            .oneshot(
                HttpRequest::get("/me")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
