//! Chat webhooks (Slack, Discord, Teams) and a generic JSON webhook

use super::{check_response, http_client, Integration};
use crate::shared::config::WebhookKind;
use crate::shared::error::{FeedbackError, Result};
use crate::shared::feedback::FeedbackRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

pub struct WebhookIntegration {
    kind: WebhookKind,
    url: String,
    client: Client,
}

impl WebhookIntegration {
    pub fn new(kind: WebhookKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            client: http_client(),
        }
    }

    /// Body posted to the hook
    pub fn payload(&self, record: &FeedbackRecord) -> Result<Value> {
        let text = format!("New feedback {}\n{}", record.title(), record.message);
        let payload = match self.kind {
            WebhookKind::Slack => json!({ "text": text }),
            WebhookKind::Discord => json!({ "content": text }),
            WebhookKind::Teams => json!({
                "@type": "MessageCard",
                "@context": "https://schema.org/extensions",
                "summary": record.title(),
                "text": text,
            }),
            WebhookKind::Generic => json!({
                "event": "feedback.created",
                "feedback": serde_json::to_value(record)
                    .map_err(|e| FeedbackError::integration(self.name(), e.to_string()))?,
            }),
        };
        Ok(payload)
    }
}

#[async_trait]
impl Integration for WebhookIntegration {
    fn name(&self) -> &str {
        match self.kind {
            WebhookKind::Slack => "slack",
            WebhookKind::Discord => "discord",
            WebhookKind::Teams => "teams",
            WebhookKind::Generic => "webhook",
        }
    }

    async fn send_notification(&self, record: &FeedbackRecord) -> Result<()> {
        let payload = self.payload(record)?;
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| FeedbackError::integration(self.name(), e.to_string()))?;
        check_response(self.name(), response).await?;
        tracing::debug!("{} webhook notified for {}", self.name(), record.id);
        Ok(())
    }
}
