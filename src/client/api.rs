//! Feedback API Client
//!
//! Delivers records and votes to the configured endpoint.
//!
//! # Contract
//!
//! - `POST {endpoint}` with the record as JSON
//! - `POST {endpoint}/vote` with `{ feedbackId, voterId }`, or
//!   `POST {endpoint}/vote/{id}` with `{ voterId }`
//!
//! A 2xx response whose body parses as `{ success: false, error }` is still a
//! failure. Any other 2xx body counts as accepted. Non-2xx responses carry the
//! status and the body text.

use crate::client::config::Config;
use crate::shared::config::{ConfigError, VoteRoute};
use crate::shared::error::{FeedbackError, Result};
use crate::shared::feedback::FeedbackRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Remote side of the feedback flow
#[async_trait]
pub trait FeedbackApi: Send + Sync {
    /// Deliver one record
    async fn submit(&self, record: &FeedbackRecord) -> Result<()>;

    /// Register a vote by `voter_id` on `feedback_id`
    async fn vote(&self, feedback_id: &str, voter_id: &str) -> Result<()>;
}

/// Response envelope returned by the endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoteRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    feedback_id: Option<&'a str>,
    voter_id: &'a str,
}

/// reqwest-backed API client
#[derive(Debug, Clone)]
pub struct HttpFeedbackApi {
    config: Config,
    client: Client,
}

impl HttpFeedbackApi {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.feedback().request_timeout_secs))
            .user_agent(concat!("feedkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedbackError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .post(url)
            .header("Content-Type", "application/json");
        match self.config.api_key() {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    async fn handle_response(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            };
            return Err(FeedbackError::api(status.as_u16(), message));
        }

        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(ApiResponse { success: false, error }) => Err(FeedbackError::api(
                status.as_u16(),
                error.unwrap_or_else(|| "request was not accepted".to_string()),
            )),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl FeedbackApi for HttpFeedbackApi {
    async fn submit(&self, record: &FeedbackRecord) -> Result<()> {
        let url = self
            .config
            .endpoint()
            .ok_or(ConfigError::MissingValue("endpoint"))?;

        tracing::debug!("POST {} (feedback {})", url, record.id);

        let response = self
            .post(url)
            .json(record)
            .send()
            .await
            .map_err(|e| FeedbackError::network(e.to_string()))?;

        Self::handle_response(response).await
    }

    async fn vote(&self, feedback_id: &str, voter_id: &str) -> Result<()> {
        let url = self
            .config
            .vote_url(feedback_id)
            .ok_or(ConfigError::MissingValue("endpoint"))?;

        let body = VoteRequest {
            feedback_id: match self.config.feedback().vote_route {
                VoteRoute::Body => Some(feedback_id),
                VoteRoute::Path => None,
            },
            voter_id,
        };

        tracing::debug!("POST {} (vote on {})", url, feedback_id);

        let response = self
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FeedbackError::network(e.to_string()))?;

        Self::handle_response(response).await
    }
}
