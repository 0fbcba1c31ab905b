/*!
 * Credential service: password hashing and bearer-token issue/verify.
 */
pub mod google;
pub mod middleware;

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::db::models::User;

/// Claims embedded in every issued token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub role: String,
    /// Token version at issue time; a bump on the user row revokes the token
    pub ver: i64,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Hash a password with a per-call random salt. bcrypt is deliberately
/// CPU-intensive, so the work runs off the async executor.
pub async fn hash_password(password: String) -> Result<String, bcrypt::BcryptError> {
    match tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST)).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("spawn_blocking panic during hash: {}", e);
            Err(bcrypt::BcryptError::InvalidHash(
                "hashing task failed".to_string(),
            ))
        }
    }
}

/// Check a password against a stored hash. Any mismatch, malformed hash, or
/// internal failure comes back as `false`; this never errors outward.
pub async fn verify_password(password: String, hashed: String) -> bool {
    tokio::task::spawn_blocking(move || verify(password, &hashed).unwrap_or(false))
        .await
        .unwrap_or(false)
}

/// Issue a signed token for the user. Expiry is `now + session_lifetime`
/// from configuration (a year by default; see `AppConfig`).
pub fn issue_token(user: &User) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + config::CONFIG.session_lifetime;

    let claims = Claims {
        sub: user.id.clone(),
        username: user.username.clone(),
        role: user.role.clone(),
        ver: user.token_version,
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config::jwt_secret().as_bytes()),
    )
}

/// Validate signature and expiry, returning the claims on success. All
/// failure modes (malformed, expired, bad signature) collapse to `None`.
pub fn verify_token(token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config::jwt_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}
