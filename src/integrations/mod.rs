//! Third-party integrations
//!
//! Once a record is confirmed by the endpoint it can be fanned out to chat
//! webhooks, issue trackers or email. Each target implements [`Integration`];
//! which ones run is decided by the configured [`IntegrationConfig`] list.
//!
//! Integration failures are logged and reported in the [`DispatchReport`].
//! They never change a record's submission status.

pub mod webhook;
pub mod issue_tracker;
#[cfg(feature = "email")]
pub mod email;

use crate::shared::config::IntegrationConfig;
use crate::shared::error::{FeedbackError, Result};
use crate::shared::feedback::FeedbackRecord;
use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub use issue_tracker::{GitHubIssues, GitLabIssues};
pub use webhook::WebhookIntegration;

const INTEGRATION_TIMEOUT: Duration = Duration::from_secs(15);

/// A target notified about confirmed feedback
///
/// Both operations default to doing nothing, so a target only implements
/// what it supports.
#[async_trait]
pub trait Integration: Send + Sync {
    /// Short provider name used in logs and errors
    fn name(&self) -> &str;

    /// Open an issue for the record, returning its identifier
    async fn create_issue(&self, _record: &FeedbackRecord) -> Result<Option<String>> {
        Ok(None)
    }

    /// Post a notification about the record
    async fn send_notification(&self, _record: &FeedbackRecord) -> Result<()> {
        Ok(())
    }
}

/// Markdown body shared by issue trackers and email
pub fn format_body(record: &FeedbackRecord) -> String {
    let mut body = format!(
        "**Type:** {}\n**Submitted:** {}\n",
        record.feedback_type,
        record.timestamp.to_rfc3339()
    );
    if let Some(category) = &record.category {
        body.push_str(&format!("**Category:** {}", category));
        if let Some(subcategory) = &record.subcategory {
            body.push_str(&format!(" / {}", subcategory));
        }
        body.push('\n');
    }
    if let Some(meta) = &record.metadata {
        if let Some(url) = &meta.url {
            body.push_str(&format!("**Page:** {}\n", url));
        }
        if let Some(email) = &meta.email {
            body.push_str(&format!("**Contact:** {}\n", email));
        }
    }
    body.push_str(&format!("\n{}\n", record.message));
    if !record.attachments.is_empty() {
        body.push_str("\n**Attachments:**\n");
        for a in &record.attachments {
            body.push_str(&format!("- {} ({}, {} bytes)\n", a.filename, a.mime_type, a.size));
        }
    }
    body.push_str(&format!("\n_Feedback ID: {}_\n", record.id));
    body
}

pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(INTEGRATION_TIMEOUT)
        .user_agent(concat!("feedkit/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

/// Map a non-2xx response into an integration error
pub(crate) async fn check_response(provider: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(FeedbackError::integration(
        provider,
        format!("HTTP {}: {}", status.as_u16(), body.trim()),
    ))
}

/// Build the integration for one config entry
pub fn from_config(config: &IntegrationConfig) -> Result<Arc<dyn Integration>> {
    let integration: Arc<dyn Integration> = match config {
        IntegrationConfig::Webhook { kind, url } => Arc::new(WebhookIntegration::new(*kind, url)),
        IntegrationConfig::GitHub {
            owner,
            repo,
            token,
            labels,
            api_base,
        } => Arc::new(
            GitHubIssues::new(owner, repo, token)
                .with_labels(labels.clone())
                .with_api_base(api_base.as_deref()),
        ),
        IntegrationConfig::GitLab {
            base_url,
            project,
            token,
            labels,
        } => Arc::new(
            GitLabIssues::new(base_url.as_deref(), project, token).with_labels(labels.clone()),
        ),
        #[cfg(feature = "email")]
        IntegrationConfig::Email {
            smtp_host,
            username,
            password,
            from,
            to,
        } => Arc::new(email::EmailIntegration::new(
            smtp_host,
            username.as_deref(),
            password.as_deref(),
            from,
            to,
        )?),
        #[cfg(not(feature = "email"))]
        IntegrationConfig::Email { .. } => {
            return Err(FeedbackError::integration(
                "email",
                "built without the `email` feature",
            ))
        }
    };
    Ok(integration)
}

/// Outcome of fanning out one record
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// (provider, issue id) for every issue created
    pub issues: Vec<(String, String)>,
    pub notified: Vec<String>,
    pub errors: Vec<FeedbackError>,
}

/// Runs every configured integration for a record
#[derive(Default)]
pub struct IntegrationHub {
    integrations: Vec<Arc<dyn Integration>>,
}

impl std::fmt::Debug for IntegrationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.integrations.iter().map(|i| i.name()).collect();
        f.debug_struct("IntegrationHub").field("integrations", &names).finish()
    }
}

impl IntegrationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration, skipping entries that cannot be constructed
    pub fn from_configs(configs: &[IntegrationConfig]) -> Self {
        let mut hub = Self::new();
        for config in configs {
            match from_config(config) {
                Ok(integration) => hub.integrations.push(integration),
                Err(e) => tracing::error!("Skipping integration: {}", e),
            }
        }
        hub
    }

    pub fn with(mut self, integration: Arc<dyn Integration>) -> Self {
        self.integrations.push(integration);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.integrations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.integrations.len()
    }

    /// Run [`dispatch`](Self::dispatch) in the background
    ///
    /// Returns `None` when there is nothing to run. The caller may drop the
    /// handle; failures are logged either way.
    pub fn spawn_dispatch(self: &Arc<Self>, record: FeedbackRecord) -> Option<JoinHandle<DispatchReport>> {
        if self.is_empty() {
            return None;
        }
        let hub = Arc::clone(self);
        Some(tokio::spawn(async move { hub.dispatch(&record).await }))
    }

    /// Run every integration for `record` concurrently
    pub async fn dispatch(&self, record: &FeedbackRecord) -> DispatchReport {
        let mut report = DispatchReport::default();
        if self.integrations.is_empty() {
            return report;
        }

        let runs = self.integrations.iter().map(|integration| async move {
            let issue = integration.create_issue(record).await;
            let notification = integration.send_notification(record).await;
            (integration.name().to_string(), issue, notification)
        });

        for (name, issue, notification) in join_all(runs).await {
            match issue {
                Ok(Some(id)) => {
                    tracing::info!("{} issue {} created for feedback {}", name, id, record.id);
                    report.issues.push((name.clone(), id));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("{} issue creation failed for {}: {}", name, record.id, e);
                    report.errors.push(e);
                }
            }
            match notification {
                Ok(()) => report.notified.push(name),
                Err(e) => {
                    tracing::error!("{} notification failed for {}: {}", name, record.id, e);
                    report.errors.push(e);
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::WebhookKind;
    use crate::shared::feedback::{Attachment, FeedbackExtra, FeedbackType};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Failing;

    #[async_trait]
    impl Integration for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn send_notification(&self, _record: &FeedbackRecord) -> Result<()> {
            Err(FeedbackError::integration("failing", "boom"))
        }
    }

    #[derive(Default)]
    struct Counting(AtomicUsize);

    #[async_trait]
    impl Integration for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn create_issue(&self, _record: &FeedbackRecord) -> Result<Option<String>> {
            let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Some(n.to_string()))
        }
    }

    fn record() -> FeedbackRecord {
        FeedbackRecord::new(
            "Search is slow",
            FeedbackType::Improvement,
            FeedbackExtra {
                category: Some("performance".into()),
                attachments: vec![Attachment::new("trace.txt", "text/plain", 42)],
                ..FeedbackExtra::default()
            },
        )
    }

    #[tokio::test]
    async fn test_dispatch_collects_results_and_errors() {
        let hub = IntegrationHub::new()
            .with(Arc::new(Failing))
            .with(Arc::new(Counting::default()));

        let report = hub.dispatch(&record()).await;
        assert_eq!(report.issues, vec![("counting".to_string(), "1".to_string())]);
        assert_eq!(report.notified, vec!["counting".to_string()]);
        assert_eq!(report.errors.len(), 1);
    }

    struct Slow;

    #[async_trait]
    impl Integration for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        async fn send_notification(&self, _record: &FeedbackRecord) -> Result<()> {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_spawn_dispatch_runs_in_background() {
        let hub = Arc::new(IntegrationHub::new().with(Arc::new(Slow)));

        let started = std::time::Instant::now();
        let handle = hub.spawn_dispatch(record()).unwrap();
        assert!(started.elapsed() < Duration::from_millis(100));

        let report = handle.await.unwrap();
        assert_eq!(report.notified, vec!["slow".to_string()]);
        assert!(Arc::new(IntegrationHub::new()).spawn_dispatch(record()).is_none());
    }

    #[tokio::test]
    async fn test_empty_hub_is_noop() {
        let report = IntegrationHub::new().dispatch(&record()).await;
        assert!(report.issues.is_empty() && report.notified.is_empty() && report.errors.is_empty());
    }

    #[test]
    fn test_from_configs() {
        let hub = IntegrationHub::from_configs(&[
            IntegrationConfig::Webhook {
                kind: WebhookKind::Slack,
                url: "https://hooks.slack.com/services/x".into(),
            },
            IntegrationConfig::GitHub {
                owner: "acme".into(),
                repo: "app".into(),
                token: "t".into(),
                labels: vec![],
                api_base: None,
            },
        ]);
        assert_eq!(hub.len(), 2);
    }

    #[test]
    fn test_format_body() {
        let record = record();
        let body = format_body(&record);
        assert!(body.contains("**Type:** improvement"));
        assert!(body.contains("**Category:** performance"));
        assert!(body.contains("Search is slow"));
        assert!(body.contains("- trace.txt (text/plain, 42 bytes)"));
        assert!(body.contains(&record.id));
    }
}
