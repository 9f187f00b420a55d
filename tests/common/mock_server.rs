//! Mock server helpers for integration tests
//!
//! Wraps wiremock with the responses the feedback endpoint gives.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const FEEDBACK_PATH: &str = "/api/feedback";

/// A mock feedback endpoint
pub struct MockFeedbackServer {
    pub server: MockServer,
}

impl MockFeedbackServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// URL to configure as the endpoint
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.server.uri(), FEEDBACK_PATH)
    }

    /// Accept every submission with `{ "success": true }`
    pub async fn accept_submissions(&self) {
        Mock::given(method("POST"))
            .and(path(FEEDBACK_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })))
            .mount(&self.server)
            .await;
    }

    /// Answer every submission with `status` and a plain-text body
    pub async fn fail_submissions(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path(FEEDBACK_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Answer votes on the body route with `status`
    pub async fn answer_votes(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(format!("{}/vote", FEEDBACK_PATH)))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({ "success": status < 400 })))
            .mount(&self.server)
            .await;
    }

    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    pub async fn request_count(&self) -> usize {
        self.requests().await.len()
    }
}
