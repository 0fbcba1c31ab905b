//! Federated sign-in through Google's OAuth 2.0 authorization-code flow.
//!
//! The adapter exchanges a Google-verified identity for a local user and a
//! local token. Only emails on the injected allow-list may complete the
//! exchange; everyone else is turned away before any user record is written.

use std::collections::HashMap;

use chrono::Utc;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::{AdminPolicy, GoogleConfig};
use crate::db::models::{NewUser, User};
use crate::db::Store;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// A sign-in must finish within this window or its state is discarded.
const STATE_TTL_SECS: i64 = 600;

type OAuthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

lazy_static::lazy_static! {
    /// CSRF state for in-flight sign-ins, keyed by the state parameter.
    static ref PENDING_STATES: RwLock<HashMap<String, PendingState>> =
        RwLock::new(HashMap::new());
}

#[derive(Debug, Clone)]
struct PendingState {
    pkce_verifier: String,
    expires_at: i64,
}

async fn insert_pending_state(state: String, pkce_verifier: String) {
    let now = Utc::now().timestamp();
    let mut states = PENDING_STATES.write().await;
    // Evict abandoned sign-ins so the map stays bounded.
    states.retain(|_, pending| pending.expires_at > now);
    states.insert(
        state,
        PendingState {
            pkce_verifier,
            expires_at: now + STATE_TTL_SECS,
        },
    );
}

/// One-shot lookup: a state is consumed whether or not the exchange succeeds.
async fn take_pending_state(state: &str) -> Option<PendingState> {
    let mut states = PENDING_STATES.write().await;
    let pending = states.remove(state)?;
    if pending.expires_at <= Utc::now().timestamp() {
        return None;
    }
    Some(pending)
}

/// Identity fields read from Google's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug)]
pub enum GoogleAuthError {
    /// Client id/secret not configured for this deployment.
    NotConfigured,
    Config(String),
    /// Unknown, reused, or expired state parameter.
    InvalidState,
    Exchange(String),
    /// The provider asserted an identity without an email.
    MissingEmail,
    /// The email is not on the admin allow-list.
    EmailNotAllowed,
    Database(sqlx::Error),
    Token(jsonwebtoken::errors::Error),
}

impl GoogleAuthError {
    /// Stable code carried back to the login page as `?error=`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "google_auth_disabled",
            Self::Config(_) | Self::Exchange(_) => "google_auth_failed",
            Self::InvalidState => "invalid_state",
            Self::MissingEmail => "no_email",
            Self::EmailNotAllowed => "unauthorized_email",
            Self::Database(_) | Self::Token(_) => "server_error",
        }
    }
}

impl std::fmt::Display for GoogleAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "Google OAuth is not configured"),
            Self::Config(msg) => write!(f, "Google OAuth configuration error: {}", msg),
            Self::InvalidState => write!(f, "unknown or expired OAuth state"),
            Self::Exchange(msg) => write!(f, "Google token exchange failed: {}", msg),
            Self::MissingEmail => write!(f, "no email in Google profile"),
            Self::EmailNotAllowed => write!(f, "email is not on the admin allow-list"),
            Self::Database(e) => write!(f, "database error during federated sign-in: {}", e),
            Self::Token(e) => write!(f, "failed to issue token: {}", e),
        }
    }
}

impl std::error::Error for GoogleAuthError {}

/// The federated identity adapter. Policy and provider settings are injected
/// at construction so deployments can swap either without code changes.
pub struct GoogleAuth {
    config: GoogleConfig,
    policy: AdminPolicy,
}

impl GoogleAuth {
    pub fn new(config: GoogleConfig, policy: AdminPolicy) -> Self {
        Self { config, policy }
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled()
    }

    fn client(&self) -> Result<OAuthClient, GoogleAuthError> {
        if !self.config.enabled() {
            return Err(GoogleAuthError::NotConfigured);
        }

        Ok(
            BasicClient::new(ClientId::new(self.config.client_id.clone()))
                .set_client_secret(ClientSecret::new(self.config.client_secret.clone()))
                .set_auth_uri(
                    AuthUrl::new(AUTH_URL.to_string())
                        .map_err(|e| GoogleAuthError::Config(e.to_string()))?,
                )
                .set_token_uri(
                    TokenUrl::new(TOKEN_URL.to_string())
                        .map_err(|e| GoogleAuthError::Config(e.to_string()))?,
                )
                .set_redirect_uri(
                    RedirectUrl::new(self.config.callback_url.clone())
                        .map_err(|e| GoogleAuthError::Config(e.to_string()))?,
                ),
        )
    }

    fn http_client(&self) -> Result<reqwest::Client, GoogleAuthError> {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| GoogleAuthError::Config(e.to_string()))
    }

    /// Start a sign-in: returns the Google authorization URL to redirect to.
    pub async fn begin(&self) -> Result<String, GoogleAuthError> {
        let client = self.client()?;

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf_token) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        insert_pending_state(
            csrf_token.secret().clone(),
            pkce_verifier.secret().clone(),
        )
        .await;

        Ok(auth_url.to_string())
    }

    /// Finish a sign-in: exchange the code, fetch the profile, and map it to
    /// a local user plus a freshly issued token.
    pub async fn complete(
        &self,
        code: &str,
        state: &str,
        store: &Store,
    ) -> Result<(User, String), GoogleAuthError> {
        let pending = take_pending_state(state)
            .await
            .ok_or(GoogleAuthError::InvalidState)?;

        let client = self.client()?;
        let http = self.http_client()?;

        let token_response = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pending.pkce_verifier))
            .request_async(&http)
            .await
            .map_err(|e| GoogleAuthError::Exchange(e.to_string()))?;

        let profile: GoogleProfile = http
            .get(USERINFO_URL)
            .bearer_auth(token_response.access_token().secret())
            .send()
            .await
            .map_err(|e| GoogleAuthError::Exchange(e.to_string()))?
            .json()
            .await
            .map_err(|e| GoogleAuthError::Exchange(e.to_string()))?;

        let user = self.resolve_local_user(store, profile).await?;
        let token = super::issue_token(&user).map_err(GoogleAuthError::Token)?;

        Ok((user, token))
    }

    /// Map a verified external profile to a local user. A rejected exchange
    /// never creates a user record.
    pub(crate) async fn resolve_local_user(
        &self,
        store: &Store,
        profile: GoogleProfile,
    ) -> Result<User, GoogleAuthError> {
        let email = profile
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .ok_or(GoogleAuthError::MissingEmail)?;

        if !self.policy.permits(&email) {
            tracing::warn!(
                subject = %profile.sub,
                "Rejected federated sign-in for non-allow-listed email"
            );
            return Err(GoogleAuthError::EmailNotAllowed);
        }

        match store
            .get_user_by_email(&email)
            .await
            .map_err(GoogleAuthError::Database)?
        {
            Some(user) => {
                store
                    .update_user_last_login(&user.id)
                    .await
                    .map_err(GoogleAuthError::Database)?;
                tracing::info!("Federated sign-in for existing user: {}", user.username);
                Ok(user)
            }
            None => {
                let username = email
                    .split('@')
                    .next()
                    .unwrap_or(email.as_str())
                    .to_string();
                // Federated accounts have no local password login path.
                let user = store
                    .create_user(NewUser {
                        username,
                        email,
                        password_hash: String::new(),
                        role: "admin".to_string(),
                    })
                    .await
                    .map_err(GoogleAuthError::Database)?;
                tracing::info!(
                    display_name = ?profile.name,
                    "Created admin user via federated sign-in: {}",
                    user.username
                );
                Ok(user)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn adapter(allowed: &[&str]) -> GoogleAuth {
        GoogleAuth::new(
            GoogleConfig {
                client_id: "client".to_string(),
                client_secret: "secret".to_string(),
                callback_url: "http://localhost:3001/api/auth/google/callback".to_string(),
            },
            AdminPolicy::new(allowed.iter().copied()),
        )
    }

    fn profile(email: Option<&str>) -> GoogleProfile {
        GoogleProfile {
            sub: "google-sub-1".to_string(),
            email: email.map(|e| e.to_string()),
            name: Some("Kaz".to_string()),
        }
    }

    #[tokio::test]
    async fn test_missing_email_fails_without_creating_user() {
        let store = Store::new(test_pool().await);
        let result = adapter(&["kaz@example.com"])
            .resolve_local_user(&store, profile(None))
            .await;

        assert!(matches!(result, Err(GoogleAuthError::MissingEmail)));
        assert!(store
            .get_user_by_email("kaz@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_email_outside_allow_list_is_rejected() {
        let store = Store::new(test_pool().await);
        let result = adapter(&["kaz@example.com"])
            .resolve_local_user(&store, profile(Some("stranger@example.com")))
            .await;

        assert!(matches!(result, Err(GoogleAuthError::EmailNotAllowed)));
        assert!(store
            .get_user_by_email("stranger@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_first_sign_in_creates_admin_with_empty_password() {
        let store = Store::new(test_pool().await);
        let user = adapter(&["kaz@example.com"])
            .resolve_local_user(&store, profile(Some("kaz@example.com")))
            .await
            .unwrap();

        assert_eq!(user.role, "admin");
        assert_eq!(user.username, "kaz");
        assert!(user.password_hash.is_empty());
    }

    #[tokio::test]
    async fn test_repeat_sign_in_reuses_user_and_records_login() {
        let store = Store::new(test_pool().await);
        let auth = adapter(&["kaz@example.com"]);

        let first = auth
            .resolve_local_user(&store, profile(Some("kaz@example.com")))
            .await
            .unwrap();
        let second = auth
            .resolve_local_user(&store, profile(Some("KAZ@example.com")))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let reloaded = store.get_user_by_id(&first.id).await.unwrap().unwrap();
        assert!(reloaded.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_pending_state_is_single_use_and_expires() {
        insert_pending_state("state-1".to_string(), "verifier".to_string()).await;

        let taken = take_pending_state("state-1").await.unwrap();
        assert_eq!(taken.pkce_verifier, "verifier");
        assert!(take_pending_state("state-1").await.is_none());
        assert!(take_pending_state("never-issued").await.is_none());
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(GoogleAuthError::MissingEmail.code(), "no_email");
        assert_eq!(GoogleAuthError::EmailNotAllowed.code(), "unauthorized_email");
        assert_eq!(GoogleAuthError::InvalidState.code(), "invalid_state");
    }
}
