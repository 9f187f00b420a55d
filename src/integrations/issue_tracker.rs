//! Issue trackers
//!
//! GitHub uses a bearer token against the REST API. GitLab uses a
//! `PRIVATE-TOKEN` header and a URL-encoded project path.

use super::{check_response, format_body, http_client, Integration};
use crate::shared::error::{FeedbackError, Result};
use crate::shared::feedback::FeedbackRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const GITHUB_API: &str = "https://api.github.com";
const GITLAB_URL: &str = "https://gitlab.com";

fn labels_for(record: &FeedbackRecord, extra: &[String]) -> Vec<String> {
    let mut labels = vec![record.feedback_type.to_string()];
    for label in extra {
        if !labels.contains(label) {
            labels.push(label.clone());
        }
    }
    labels
}

/// Opens GitHub issues
pub struct GitHubIssues {
    owner: String,
    repo: String,
    token: String,
    labels: Vec<String>,
    api_base: String,
    client: Client,
}

#[derive(Deserialize)]
struct GitHubIssue {
    number: u64,
}

impl GitHubIssues {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
            labels: Vec::new(),
            api_base: GITHUB_API.to_string(),
            client: http_client(),
        }
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Override the API root (GitHub Enterprise)
    pub fn with_api_base(mut self, api_base: Option<&str>) -> Self {
        if let Some(base) = api_base {
            self.api_base = base.trim_end_matches('/').to_string();
        }
        self
    }
}

#[async_trait]
impl Integration for GitHubIssues {
    fn name(&self) -> &str {
        "github"
    }

    async fn create_issue(&self, record: &FeedbackRecord) -> Result<Option<String>> {
        let url = format!("{}/repos/{}/{}/issues", self.api_base, self.owner, self.repo);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&json!({
                "title": record.title(),
                "body": format_body(record),
                "labels": labels_for(record, &self.labels),
            }))
            .send()
            .await
            .map_err(|e| FeedbackError::integration("github", e.to_string()))?;

        let issue: GitHubIssue = check_response("github", response)
            .await?
            .json()
            .await
            .map_err(|e| FeedbackError::integration("github", e.to_string()))?;
        Ok(Some(issue.number.to_string()))
    }
}

/// Opens GitLab issues
pub struct GitLabIssues {
    base_url: String,
    project: String,
    token: String,
    labels: Vec<String>,
    client: Client,
}

#[derive(Deserialize)]
struct GitLabIssue {
    iid: u64,
}

impl GitLabIssues {
    pub fn new(base_url: Option<&str>, project: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or(GITLAB_URL).trim_end_matches('/').to_string(),
            project: project.into(),
            token: token.into(),
            labels: Vec::new(),
            client: http_client(),
        }
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }
}

#[async_trait]
impl Integration for GitLabIssues {
    fn name(&self) -> &str {
        "gitlab"
    }

    async fn create_issue(&self, record: &FeedbackRecord) -> Result<Option<String>> {
        let url = format!(
            "{}/api/v4/projects/{}/issues",
            self.base_url,
            urlencoding::encode(&self.project)
        );
        let response = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&json!({
                "title": record.title(),
                "description": format_body(record),
                "labels": labels_for(record, &self.labels).join(","),
            }))
            .send()
            .await
            .map_err(|e| FeedbackError::integration("gitlab", e.to_string()))?;

        let issue: GitLabIssue = check_response("gitlab", response)
            .await?
            .json()
            .await
            .map_err(|e| FeedbackError::integration("gitlab", e.to_string()))?;
        Ok(Some(issue.iid.to_string()))
    }
}
