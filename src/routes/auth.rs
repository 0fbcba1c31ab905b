/**
 * Authentication Routes
 * Local login/registration, identity echo, revocation, and the Google
 * federated sign-in handoff
 */
use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::google::GoogleAuth;
use crate::auth::middleware::AuthUser;
use crate::config::CONFIG;
use crate::db::models::{NewUser, PublicUser};
use crate::db::store::is_unique_violation;
use crate::routes::{
    bad_request, conflict, db_error, internal_error, required, require_store, ErrorResponse,
    SuccessResponse,
};

const MIN_PASSWORD_LENGTH: usize = 8;

lazy_static::lazy_static! {
    /// Federated identity adapter, wired to this deployment's provider
    /// settings and admin allow-list.
    static ref GOOGLE: GoogleAuth =
        GoogleAuth::new(CONFIG.google.clone(), CONFIG.admin_policy.clone());
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: PublicUser,
}

/// Identity as carried in the token; `/auth/me` answers from claims alone.
#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub user: IdentityInfo,
}

#[derive(Debug, Serialize)]
pub struct IdentityInfo {
    pub id: String,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<Response, Response> {
    let username = required(payload.username, "username")?;
    let password = required(payload.password, "password")?;

    let store = require_store()?;

    let user = match store
        .get_user_by_username(&username)
        .await
        .map_err(|e| db_error(e, "Authentication service temporarily unavailable"))?
    {
        Some(user) => user,
        None => {
            tracing::warn!("Login attempt for unknown user: {}", username);
            return Err(invalid_credentials());
        }
    };

    // Federated accounts carry an empty hash and cannot log in locally;
    // bcrypt verification fails closed on them.
    let password_ok =
        crate::auth::verify_password(password, user.password_hash.clone()).await;
    if !password_ok {
        tracing::warn!("Failed login attempt for: {}", username);
        return Err(invalid_credentials());
    }

    store
        .update_user_last_login(&user.id)
        .await
        .map_err(|e| db_error(e, "Failed to record login"))?;

    let token = crate::auth::issue_token(&user).map_err(|e| {
        tracing::error!("Failed to issue token: {}", e);
        internal_error("Failed to create token")
    })?;

    tracing::info!("Successful login for user: {}", user.username);

    Ok(Json(LoginResponse {
        user: PublicUser::from(&user),
        token,
    })
    .into_response())
}

fn invalid_credentials() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("Invalid credentials")),
    )
        .into_response()
}

/// POST /api/auth/register
pub async fn register(Json(payload): Json<RegisterRequest>) -> Result<Response, Response> {
    let username = required(payload.username, "username")?;
    let email = required(payload.email, "email")?;
    let password = required(payload.password, "password")?;

    if !email.contains('@') {
        return Err(bad_request("Invalid email format"));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(bad_request(
            "Password must be at least 8 characters long",
        ));
    }

    let role = payload.role.unwrap_or_else(|| "user".to_string());
    if role != "admin" && role != "user" {
        return Err(bad_request("role must be 'admin' or 'user'"));
    }

    let store = require_store()?;

    let password_hash = crate::auth::hash_password(password).await.map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        internal_error("Failed to process password")
    })?;

    let user = store
        .create_user(NewUser {
            username,
            email,
            password_hash,
            role,
        })
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                conflict("Username or email already exists")
            } else {
                db_error(e, "Failed to create account")
            }
        })?;

    tracing::info!("User registered: {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: PublicUser::from(&user),
        }),
    )
        .into_response())
}

/// GET /api/auth/me (any valid token)
pub async fn me(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    Json(IdentityResponse {
        user: IdentityInfo {
            id: user.id,
            username: user.username,
            role: user.role,
        },
    })
}

/// POST /api/auth/logout (any valid token)
///
/// Tokens are self-contained, so logout bumps the user's token version and
/// every token issued before this moment stops verifying.
pub async fn logout(Extension(user): Extension<AuthUser>) -> Result<Response, Response> {
    let store = require_store()?;

    store
        .bump_user_token_version(&user.id)
        .await
        .map_err(|e| db_error(e, "Failed to revoke sessions"))?;

    tracing::info!("Revoked all sessions for user: {}", user.username);

    Ok(Json(SuccessResponse { success: true }).into_response())
}

/// GET /api/auth/google - redirect the browser into Google's consent flow.
pub async fn google_login() -> Response {
    if !GOOGLE.enabled() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("Google OAuth not configured")),
        )
            .into_response();
    }

    match GOOGLE.begin().await {
        Ok(url) => Redirect::temporary(&url).into_response(),
        Err(e) => {
            tracing::error!("Failed to start Google sign-in: {}", e);
            login_error_redirect(e.code())
        }
    }
}

/// GET /api/auth/google/callback - finish the exchange and hand the browser
/// back to the frontend with a token, or with an error code on failure.
pub async fn google_callback(Query(query): Query<GoogleCallbackQuery>) -> Response {
    let (Some(code), Some(state)) = (query.code, query.state) else {
        return login_error_redirect("google_auth_failed");
    };

    let Some(store) = crate::db::store() else {
        return login_error_redirect("server_error");
    };

    match GOOGLE.complete(&code, &state, &store).await {
        Ok((user, token)) => {
            tracing::info!("Federated sign-in completed for: {}", user.username);
            let url = format!("{}/auth/callback?token={}", CONFIG.frontend_url, token);
            Redirect::temporary(&url).into_response()
        }
        Err(e) => {
            tracing::warn!("Federated sign-in failed: {}", e);
            login_error_redirect(e.code())
        }
    }
}

fn login_error_redirect(code: &str) -> Response {
    let url = format!("{}/login?error={}", CONFIG.frontend_url, code);
    Redirect::temporary(&url).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, post};
    use axum::{middleware, Router};
    use tower::ServiceExt;

    fn auth_router() -> Router {
        Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route(
                "/api/auth/me",
                get(me).route_layer(middleware::from_fn(
                    crate::auth::middleware::require_auth,
                )),
            )
            .route("/api/auth/google", get(google_login))
    }

    async fn post_json(uri: &str, body: serde_json::Value) -> (StatusCode, axum::body::Bytes) {
        let response = auth_router()
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    #[tokio::test]
    async fn test_login_missing_fields_is_bad_request() {
        let (status, _) = post_json(
            "/api/auth/login",
            serde_json::json!({ "username": "", "password": "pw" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_without_database_is_unavailable() {
        let (status, _) = post_json(
            "/api/auth/login",
            serde_json::json!({ "username": "kaz", "password": "secret123" }),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let (status, _) = post_json(
            "/api/auth/register",
            serde_json::json!({
                "username": "kaz",
                "email": "kaz@example.com",
                "password": "short"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_rejects_malformed_email() {
        let (status, _) = post_json(
            "/api/auth/register",
            serde_json::json!({
                "username": "kaz",
                "email": "no-at-sign",
                "password": "secret123"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_rejects_unknown_role() {
        let (status, _) = post_json(
            "/api/auth/register",
            serde_json::json!({
                "username": "kaz",
                "email": "kaz@example.com",
                "password": "secret123",
                "role": "superuser"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_me_without_token_is_unauthorized() {
        let response = auth_router()
            .oneshot(Request::get("/api/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_echoes_token_identity() {
        let user = crate::db::models::User {
            id: "u-9".to_string(),
            username: "kaz".to_string(),
            email: "kaz@example.com".to_string(),
            password_hash: String::new(),
            role: "admin".to_string(),
            token_version: 0,
            created_at: chrono::Utc::now(),
            last_login_at: None,
        };
        let token = crate::auth::issue_token(&user).unwrap();

        let response = auth_router()
            .oneshot(
                Request::get("/api/auth/me")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["user"]["id"], "u-9");
        assert_eq!(body["user"]["username"], "kaz");
        assert_eq!(body["user"]["role"], "admin");
    }

    #[tokio::test]
    async fn test_google_login_unconfigured_is_unavailable() {
        // No GOOGLE_CLIENT_ID/SECRET in the test environment.
        let response = auth_router()
            .oneshot(Request::get("/api/auth/google").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
