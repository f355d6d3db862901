use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    Default,
}

/// Platform facility that puts a reminder in front of the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;
    async fn request_permission(&self) -> Permission;
    /// Fire-and-forget: delivery failures are not reported back.
    async fn show(&self, title: &str, body: &str);
}

/// Writes reminders to the application log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn show(&self, title: &str, body: &str) {
        tracing::info!(target: "studydesk::reminder", "{} {}", title, body);
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    title: &'a str,
    body: &'a str,
}

/// Posts reminders as JSON to a user-configured URL.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn show(&self, title: &str, body: &str) {
        let request = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { title, body });

        tokio::spawn(async move {
            match request.send().await {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!("Reminder webhook returned {}", response.status());
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Reminder webhook failed: {}", e),
            }
        });
    }
}
