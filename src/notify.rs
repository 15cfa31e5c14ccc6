use std::time::Duration;

use serde_json::{json, Value};

/// Fire-and-forget client for the external notification service.
///
/// Delivery failures are logged and never affect the core operation. When no
/// service URL is configured the notifier is a no-op.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl Notifier {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Notify that an invitation code was created
    pub fn invitation_created(&self, inviter_id: i64, code: &str, is_group_code: bool) {
        let notification_type = if is_group_code {
            "group_family_invitation"
        } else {
            "family_invitation"
        };
        self.send(
            "/api/v1/notifications/invite",
            json!({
                "inviter_id": inviter_id,
                "invitation_code": code,
                "notification_type": notification_type,
            }),
        );
    }

    /// Notify that a guardian connected to a senior
    pub fn family_connected(
        &self,
        guardian_id: i64,
        senior_id: i64,
        relationship_type_id: Option<i64>,
    ) {
        self.send(
            "/api/v1/notifications/connect",
            json!({
                "guardian_id": guardian_id,
                "senior_id": senior_id,
                "relationship_type": relationship_type_id,
            }),
        );
    }

    fn send(&self, endpoint: &str, payload: Value) {
        let Some(base_url) = self.base_url.clone() else {
            tracing::debug!("Notification service not configured, skipping {}", endpoint);
            return;
        };

        let client = self.client.clone();
        let url = format!("{}{}", base_url, endpoint);
        let endpoint = endpoint.to_string();

        tokio::spawn(async move {
            let result = client
                .post(&url)
                .json(&payload)
                .timeout(Duration::from_secs(10))
                .send()
                .await;
            match result {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!("Notification delivered: {}", endpoint);
                }
                Ok(response) => {
                    tracing::warn!(
                        "Notification rejected: {} (status {})",
                        endpoint,
                        response.status()
                    );
                }
                Err(e) => {
                    tracing::warn!("Notification delivery failed: {}: {}", endpoint, e);
                }
            }
        });
    }
}
