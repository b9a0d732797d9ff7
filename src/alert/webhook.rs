//! Chat webhook delivery.
//!
//! Posts `{"text": <message>}` to an incoming-webhook endpoint
//! (Mattermost/Slack compatible). Any non-2xx response is an error.

use async_trait::async_trait;
use serde::Serialize;

use crate::alert::AlertSink;
use crate::error::{AppError, Result};
use crate::models::AlertConfig;
use crate::utils::http::create_async_client;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Sink posting messages to a webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    /// Create a sink for the given URL using the alert timeout.
    pub fn new(url: impl Into<String>, config: &AlertConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl AlertSink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, category: &str, message: &str) -> Result<()> {
        log::debug!(
            "Posting {} alert ({} chars) to webhook",
            category,
            message.len()
        );

        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text: message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::alert(format!(
                "webhook returned {}: {}",
                status,
                body.trim()
            )));
        }

        log::info!("Alert for {} delivered ({})", category, status);
        Ok(())
    }
}
