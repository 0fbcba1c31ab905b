//! Application configuration, loaded from the environment once at startup.

use std::collections::HashSet;

use chrono::Duration;

lazy_static::lazy_static! {
    /// Process-wide configuration snapshot.
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}

/// Signing secret for access tokens.
pub fn jwt_secret() -> &'static str {
    &CONFIG.jwt_secret
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    /// How long an issued token stays valid. Deliberately long (a year by
    /// default) so admin sessions do not expire in normal use; early
    /// invalidation goes through the per-user token version instead.
    pub session_lifetime: Duration,
    /// Emails permitted to sign in through the federated login path.
    pub admin_policy: AdminPolicy,
    pub google: GoogleConfig,
    /// Where the federated callback sends the browser on success/failure.
    pub frontend_url: String,
    /// Optional JSON webhook for contact-submission notifications.
    pub contact_webhook_url: Option<String>,
    pub site_url: String,
    pub site_title: String,
    pub site_description: String,
    pub upload_dir: String,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

impl GoogleConfig {
    /// Federated login is only offered when both credentials are present.
    pub fn enabled(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let session_days: i64 = std::env::var("SESSION_LIFETIME_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(365);

        Self {
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "default-jwt-secret-change-in-production".to_string()),
            session_lifetime: Duration::days(session_days),
            admin_policy: AdminPolicy::from_env(),
            google: GoogleConfig {
                client_id: std::env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
                client_secret: std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
                callback_url: std::env::var("GOOGLE_CALLBACK_URL").unwrap_or_else(|_| {
                    "http://localhost:3001/api/auth/google/callback".to_string()
                }),
            },
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            contact_webhook_url: std::env::var("CONTACT_WEBHOOK_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            site_url: std::env::var("SITE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            site_title: std::env::var("SITE_TITLE")
                .unwrap_or_else(|_| "Portfolio Blog".to_string()),
            site_description: std::env::var("SITE_DESCRIPTION")
                .unwrap_or_else(|_| "Latest articles and case studies".to_string()),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
        }
    }
}

/// Allow-list of identities permitted to become admins via federated login.
///
/// Built from `ADMIN_EMAILS` (comma-separated) and passed by value to the
/// adapter that needs it, so a deployment can swap the policy without
/// touching the sign-in code.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    emails: HashSet<String>,
}

impl AdminPolicy {
    pub fn from_env() -> Self {
        let emails = std::env::var("ADMIN_EMAILS")
            .unwrap_or_default()
            .split(',')
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { emails }
    }

    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Case-insensitive membership check.
    pub fn permits(&self, email: &str) -> bool {
        self.emails.contains(&email.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}
