//! Feedback configuration module
//!
//! Provides the configuration consumed by the provider, the sync service and
//! the integration hub. Build it with [`FeedbackConfig::builder`] or load it
//! from TOML:
//!
//! ```toml
//! endpoint = "https://example.com/api/feedback"
//! offline_support = true
//! max_sync_attempts = 10
//!
//! [attachments]
//! max_count = 3
//!
//! [[integrations]]
//! provider = "webhook"
//! kind = "slack"
//! url = "https://hooks.slack.com/services/T000/B000/XXXX"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default upper bound on message length, in characters
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 5000;
/// Default maximum attachment count per record
pub const DEFAULT_MAX_ATTACHMENTS: usize = 5;
/// Default per-file size limit (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
/// Default cap on failed sync attempts per record
pub const DEFAULT_MAX_SYNC_ATTEMPTS: u32 = 10;

/// Attachment acceptance rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentPolicy {
    pub max_count: usize,
    /// Per-file limit in bytes
    pub max_file_size: u64,
    /// MIME patterns; `image/*` matches any image type
    pub allowed_types: Vec<String>,
    /// Inline data URLs longer than this are dropped before persisting
    pub max_inline_bytes: usize,
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self {
            max_count: DEFAULT_MAX_ATTACHMENTS,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_types: vec![
                "image/*".to_string(),
                "application/pdf".to_string(),
                "text/plain".to_string(),
            ],
            max_inline_bytes: 512 * 1024,
        }
    }
}

impl AttachmentPolicy {
    /// Whether `mime_type` matches one of the allowed patterns
    pub fn allows_type(&self, mime_type: &str) -> bool {
        let mime_type = mime_type.to_ascii_lowercase();
        self.allowed_types.iter().any(|pattern| {
            let pattern = pattern.to_ascii_lowercase();
            match pattern.strip_suffix("/*") {
                Some(prefix) => mime_type
                    .split_once('/')
                    .map(|(top, _)| top == prefix)
                    .unwrap_or(false),
                None => pattern == "*" || pattern == mime_type,
            }
        })
    }
}

/// How votes are addressed on the endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteRoute {
    /// `POST {endpoint}/vote` with `{ feedbackId, voterId }`
    #[default]
    Body,
    /// `POST {endpoint}/vote/{id}` with `{ voterId }`
    Path,
}

/// Chat webhook flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookKind {
    Slack,
    Discord,
    Teams,
    Generic,
}

/// A third-party fan-out target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum IntegrationConfig {
    Webhook {
        kind: WebhookKind,
        url: String,
    },
    #[serde(rename = "github")]
    GitHub {
        owner: String,
        repo: String,
        token: String,
        #[serde(default)]
        labels: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_base: Option<String>,
    },
    #[serde(rename = "gitlab")]
    GitLab {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
        project: String,
        token: String,
        #[serde(default)]
        labels: Vec<String>,
    },
    Email {
        smtp_host: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        username: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
        from: String,
        to: Vec<String>,
    },
}

/// Feedback configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Submission endpoint. Without one, feedback stays local.
    pub endpoint: Option<String>,
    /// Sent as `Authorization: Bearer <key>`
    pub api_key: Option<String>,
    /// Queue records locally when they cannot be delivered
    pub offline_support: bool,
    pub max_message_length: usize,
    pub attachments: AttachmentPolicy,
    pub vote_route: VoteRoute,
    /// Failed sync attempts after which a record is no longer retried.
    /// `None` retries forever.
    pub max_sync_attempts: Option<u32>,
    pub request_timeout_secs: u64,
    /// Prefix applied to every storage key
    pub storage_namespace: String,
    pub integrations: Vec<IntegrationConfig>,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            offline_support: true,
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            attachments: AttachmentPolicy::default(),
            vote_route: VoteRoute::default(),
            max_sync_attempts: Some(DEFAULT_MAX_SYNC_ATTEMPTS),
            request_timeout_secs: 30,
            storage_namespace: String::new(),
            integrations: Vec::new(),
        }
    }
}

impl FeedbackConfig {
    /// Create a new FeedbackConfigBuilder
    pub fn builder() -> FeedbackConfigBuilder {
        FeedbackConfigBuilder::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: FeedbackConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(endpoint) = &self.endpoint {
            validate_url(endpoint)?;
        }
        if self.max_message_length == 0 {
            return Err(ConfigError::InvalidValue("max_message_length must be greater than 0"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("request_timeout_secs must be greater than 0"));
        }
        if self.max_sync_attempts == Some(0) {
            return Err(ConfigError::InvalidValue("max_sync_attempts must be greater than 0"));
        }
        for integration in &self.integrations {
            match integration {
                IntegrationConfig::Webhook { url, .. } => validate_url(url)?,
                IntegrationConfig::Email { to, .. } if to.is_empty() => {
                    return Err(ConfigError::MissingValue("email recipients"));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Endpoint without a trailing slash
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().map(|e| e.trim_end_matches('/'))
    }

    /// Storage key with the namespace applied
    pub fn storage_key(&self, key: &str) -> String {
        if self.storage_namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.storage_namespace, key)
        }
    }
}

fn validate_url(url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl(url.to_string()))
    }
}

/// Builder for FeedbackConfig
#[derive(Debug, Default)]
pub struct FeedbackConfigBuilder {
    config: FeedbackConfig,
}

impl FeedbackConfigBuilder {
    /// Set the submission endpoint
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn offline_support(mut self, enabled: bool) -> Self {
        self.config.offline_support = enabled;
        self
    }

    pub fn max_message_length(mut self, max: usize) -> Self {
        self.config.max_message_length = max;
        self
    }

    pub fn attachments(mut self, policy: AttachmentPolicy) -> Self {
        self.config.attachments = policy;
        self
    }

    pub fn vote_route(mut self, route: VoteRoute) -> Self {
        self.config.vote_route = route;
        self
    }

    pub fn max_sync_attempts(mut self, max: Option<u32>) -> Self {
        self.config.max_sync_attempts = max;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn storage_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.storage_namespace = namespace.into();
        self
    }

    pub fn integration(mut self, integration: IntegrationConfig) -> Self {
        self.config.integrations.push(integration);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<FeedbackConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("failed to read config: {0}")]
    Io(String),
}
