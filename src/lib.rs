//! Portfolio CMS backend - library for app logic and testing

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod notify;
pub mod routes;

use axum::{
    handler::Handler,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, trace::TraceLayer,
};

use auth::middleware::{require_admin, require_auth};

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_URL.
/// Falls back to localhost origins for development.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .and_then(|s| {
            let origins: Vec<HeaderValue> = s
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        })
        .or_else(|| {
            config::CONFIG
                .frontend_url
                .parse()
                .ok()
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                "http://localhost:3000".parse().unwrap(),
                "http://127.0.0.1:3000".parse().unwrap(),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Create and configure the application router.
///
/// Write routes sit behind the admin gate; contact intake and content reads
/// are public.
pub fn create_app() -> Router {
    let cors = configure_cors();
    tracing::info!("CORS configured");

    Router::new()
        // Auth
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/register", post(routes::auth::register))
        .route(
            "/api/auth/me",
            get(routes::auth::me).route_layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/auth/logout",
            post(routes::auth::logout).route_layer(middleware::from_fn(require_auth)),
        )
        .route("/api/auth/google", get(routes::auth::google_login))
        .route(
            "/api/auth/google/callback",
            get(routes::auth::google_callback),
        )
        // Projects
        .route(
            "/api/projects",
            get(routes::projects::list_projects).post(
                routes::projects::create_project.layer(middleware::from_fn(require_admin)),
            ),
        )
        .route(
            "/api/projects/{id}",
            get(routes::projects::get_project)
                .put(routes::projects::update_project.layer(middleware::from_fn(require_admin)))
                .delete(
                    routes::projects::delete_project.layer(middleware::from_fn(require_admin)),
                ),
        )
        // Blog posts
        .route(
            "/api/blog-posts",
            get(routes::blog::list_posts)
                .post(routes::blog::create_post.layer(middleware::from_fn(require_admin))),
        )
        .route(
            "/api/blog-posts/{id}",
            get(routes::blog::get_post)
                .put(routes::blog::update_post.layer(middleware::from_fn(require_admin)))
                .delete(routes::blog::delete_post.layer(middleware::from_fn(require_admin))),
        )
        // Testimonials
        .route(
            "/api/testimonials",
            get(routes::testimonials::list_testimonials).post(
                routes::testimonials::create_testimonial
                    .layer(middleware::from_fn(require_admin)),
            ),
        )
        .route(
            "/api/testimonials/{id}",
            get(routes::testimonials::get_testimonial)
                .put(
                    routes::testimonials::update_testimonial
                        .layer(middleware::from_fn(require_admin)),
                )
                .delete(
                    routes::testimonials::delete_testimonial
                        .layer(middleware::from_fn(require_admin)),
                ),
        )
        // Contact submissions: public intake, admin review
        .route(
            "/api/contact-submissions",
            post(routes::contact::create_submission).get(
                routes::contact::list_submissions.layer(middleware::from_fn(require_admin)),
            ),
        )
        .route(
            "/api/contact-submissions/{id}",
            get(routes::contact::get_submission)
                .delete(routes::contact::delete_submission)
                .route_layer(middleware::from_fn(require_admin)),
        )
        // Resumes
        .route(
            "/api/resumes",
            post(routes::resumes::create_resume)
                .get(routes::resumes::list_resumes)
                .route_layer(middleware::from_fn(require_admin)),
        )
        .route("/api/resumes/active", get(routes::resumes::get_active_resume))
        .route(
            "/api/resumes/{id}",
            get(routes::resumes::get_resume)
                .put(routes::resumes::update_resume.layer(middleware::from_fn(require_admin)))
                .delete(
                    routes::resumes::delete_resume.layer(middleware::from_fn(require_admin)),
                ),
        )
        .route(
            "/api/resumes/{id}/set-active",
            post(routes::resumes::set_active)
                .route_layer(middleware::from_fn(require_admin)),
        )
        // Uploads
        .route(
            "/api/upload/blog-image",
            post(routes::upload::upload_blog_image)
                .route_layer(middleware::from_fn(require_admin)),
        )
        // Feeds
        .route("/api/rss.xml", get(routes::feeds::rss_feed))
        .route("/api/sitemap.xml", get(routes::feeds::sitemap))
        // Health
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed))
        // Stored uploads are served statically
        .nest_service("/uploads", ServeDir::new(&config::CONFIG.upload_dir))
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // Global request body cap; resume uploads top out at 10 MB plus
        // multipart overhead
        .layer(RequestBodyLimitLayer::new(12 * 1024 * 1024))
        .layer(cors)
}

/// Run the server (used by main).
pub async fn run() {
    dotenvy::dotenv().ok();

    // Guards must be held for the process lifetime; dropping them early
    // shuts down the background log-writer threads.
    let _log_guards = logging::init();

    routes::health::init_start_time();

    // Refuse to start in production with the insecure default JWT secret.
    let environment = std::env::var("ENVIRONMENT").unwrap_or_default();
    if environment == "production" {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        if secret.is_empty() || secret == "default-jwt-secret-change-in-production" {
            panic!(
                "FATAL: JWT_SECRET must be set to a secure, unique value in production. \
                 Refusing to start with the default secret."
            );
        }

        if config::CONFIG.admin_policy.is_empty() {
            tracing::warn!(
                "ADMIN_EMAILS is empty; federated sign-in will reject every account."
            );
        }
    }

    match db::init_pool(None).await {
        Ok(pool) => {
            if let Err(e) = db::run_migrations(&pool).await {
                tracing::error!("Failed to run database migrations: {}", e);
            }
        }
        Err(e) => {
            tracing::warn!(
                "Failed to initialize database pool: {}. Continuing without database.",
                e
            );
        }
    }

    let app = create_app();

    // Bind address is configurable via HOST / PORT, defaulting to
    // 127.0.0.1:3001 so existing dev setups keep working unchanged.
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3001);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Invalid HOST/PORT configuration");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}
