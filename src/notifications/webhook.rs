use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::notifications::{Notification, NotificationSink};
use crate::utils::{AppError, Result};

/// Posts each event as JSON to a configured webhook endpoint.
pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            webhook_url: webhook_url.to_string(),
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    async fn emit(&self, notification: Notification) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&notification)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Notification(format!(
                "webhook returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
