//! Submission validation
//!
//! Runs before a record is created. A failure here never reaches the network
//! or the pending store.

use crate::shared::config::{AttachmentPolicy, FeedbackConfig};
use crate::shared::error::ValidationError;
use crate::shared::feedback::Attachment;

/// Check the message text against the configured length bound
pub fn validate_message(message: &str, max_length: usize) -> Result<(), ValidationError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    let actual = trimmed.chars().count();
    if actual > max_length {
        return Err(ValidationError::MessageTooLong {
            max: max_length,
            actual,
        });
    }
    Ok(())
}

/// Check attachment count, size and type
pub fn validate_attachments(
    attachments: &[Attachment],
    policy: &AttachmentPolicy,
) -> Result<(), ValidationError> {
    if attachments.len() > policy.max_count {
        return Err(ValidationError::TooManyAttachments {
            max: policy.max_count,
        });
    }
    for attachment in attachments {
        if attachment.size > policy.max_file_size {
            return Err(ValidationError::AttachmentTooLarge {
                filename: attachment.filename.clone(),
                max: policy.max_file_size,
            });
        }
        if !policy.allows_type(&attachment.mime_type) {
            return Err(ValidationError::UnsupportedAttachmentType {
                filename: attachment.filename.clone(),
                mime_type: attachment.mime_type.clone(),
            });
        }
    }
    Ok(())
}

/// Validate a full submission
pub fn validate_submission(
    message: &str,
    attachments: &[Attachment],
    config: &FeedbackConfig,
) -> Result<(), ValidationError> {
    validate_message(message, config.max_message_length)?;
    validate_attachments(attachments, &config.attachments)
}
