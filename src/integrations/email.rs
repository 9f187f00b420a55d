//! Email notifications over SMTP

use super::{format_body, Integration};
use crate::shared::error::{FeedbackError, Result};
use crate::shared::feedback::FeedbackRecord;
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

pub struct EmailIntegration {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

fn mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| FeedbackError::integration("email", format!("invalid address '{}': {}", address, e)))
}

impl EmailIntegration {
    pub fn new(
        smtp_host: &str,
        username: Option<&str>,
        password: Option<&str>,
        from: &str,
        to: &[String],
    ) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
            .map_err(|e| FeedbackError::integration("email", e.to_string()))?;
        if let (Some(user), Some(pass)) = (username, password) {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }
        if to.is_empty() {
            return Err(FeedbackError::integration("email", "no recipients configured"));
        }

        Ok(Self {
            transport: builder.build(),
            from: mailbox(from)?,
            to: to.iter().map(|a| mailbox(a)).collect::<Result<_>>()?,
        })
    }

    fn message(&self, record: &FeedbackRecord) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(format!("Feedback: {}", record.title()))
            .header(ContentType::TEXT_PLAIN);
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        builder
            .body(format_body(record))
            .map_err(|e| FeedbackError::integration("email", e.to_string()))
    }
}

#[async_trait]
impl Integration for EmailIntegration {
    fn name(&self) -> &str {
        "email"
    }

    async fn send_notification(&self, record: &FeedbackRecord) -> Result<()> {
        let message = self.message(record)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| FeedbackError::integration("email", e.to_string()))?;
        Ok(())
    }
}
