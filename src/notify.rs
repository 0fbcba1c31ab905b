//! Best-effort outbound notifications.
//!
//! Notifications are fired without being awaited and must never fail or
//! delay the request that triggered them; every failure mode ends in a log
//! line and nothing else.

use std::time::Duration;

use serde_json::json;

use crate::config::CONFIG;
use crate::db::models::ContactSubmission;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Announce a new contact submission to the configured webhook, if any.
pub fn contact_submitted(submission: &ContactSubmission) {
    let Some(url) = CONFIG.contact_webhook_url.clone() else {
        tracing::info!("Contact webhook not configured; skipping notification");
        return;
    };

    let payload = json!({
        "type": "contact_submission",
        "id": submission.id,
        "name": format!("{} {}", submission.first_name, submission.last_name),
        "email": submission.email,
        "company": submission.company,
        "projectType": submission.project_type,
        "message": submission.message,
        "createdAt": submission.created_at,
    });

    tokio::spawn(async move {
        let client = match reqwest::Client::builder().timeout(DELIVERY_TIMEOUT).build() {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("Failed to build notification client: {}", e);
                return;
            }
        };

        match client.post(&url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!("Contact notification delivered");
            }
            Ok(response) => {
                tracing::warn!("Contact notification rejected: {}", response.status());
            }
            Err(e) => {
                tracing::error!("Failed to deliver contact notification: {}", e);
            }
        }
    });
}
