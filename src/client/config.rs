use crate::shared::config::{ConfigError, FeedbackConfig, FeedbackConfigBuilder, VoteRoute};

/// Client configuration wrapper.
///
/// Wraps [`FeedbackConfig`] and adds URL helpers and environment overrides:
///
/// - `FEEDBACK_CONFIG` - path to a TOML file loaded first
/// - `FEEDBACK_API_URL` - submission endpoint
/// - `FEEDBACK_API_KEY` - bearer token
/// - `FEEDBACK_OFFLINE_SUPPORT` - `0`/`false` disables local queuing
#[derive(Debug, Clone, Default)]
pub struct Config {
    feedback: FeedbackConfig,
}

impl Config {
    pub fn new(feedback: FeedbackConfig) -> Self {
        Self { feedback }
    }

    pub fn with_builder(builder: FeedbackConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self::new(builder.build()?))
    }

    /// Load configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut feedback = match std::env::var("FEEDBACK_CONFIG") {
            Ok(path) => FeedbackConfig::from_file(path)?,
            Err(_) => FeedbackConfig::default(),
        };

        if let Ok(url) = std::env::var("FEEDBACK_API_URL") {
            feedback.endpoint = Some(url);
        }
        if let Ok(key) = std::env::var("FEEDBACK_API_KEY") {
            feedback.api_key = Some(key);
        }
        if let Ok(flag) = std::env::var("FEEDBACK_OFFLINE_SUPPORT") {
            feedback.offline_support = !matches!(flag.trim(), "0" | "false" | "no" | "off");
        }

        feedback.validate()?;
        Ok(Self { feedback })
    }

    pub fn feedback(&self) -> &FeedbackConfig {
        &self.feedback
    }

    /// Submission endpoint, if configured
    pub fn endpoint(&self) -> Option<&str> {
        self.feedback.endpoint()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.feedback.api_key.as_deref()
    }

    /// Get the full URL for a path below the endpoint
    pub fn api_url(&self, path: &str) -> Option<String> {
        self.endpoint().map(|endpoint| format!("{}{}", endpoint, path))
    }

    /// URL a vote for `feedback_id` is posted to
    pub fn vote_url(&self, feedback_id: &str) -> Option<String> {
        match self.feedback.vote_route {
            VoteRoute::Body => self.api_url("/vote"),
            VoteRoute::Path => self.api_url(&format!("/vote/{}", feedback_id)),
        }
    }
}

impl From<FeedbackConfig> for Config {
    fn from(feedback: FeedbackConfig) -> Self {
        Self::new(feedback)
    }
}
