//! Completion provider trait and error classification
//!
//! This module defines the `CompletionProvider` trait that chat backends
//! implement, and the mapping from HTTP status codes to the error kinds the
//! bot handler distinguishes.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::conversation::{Message, Topic};
use crate::error::{GroqSeekerError, Result};

/// A backend that turns a conversation into an assistant reply
///
/// Implementations receive the exact ordered context for one topic and
/// return the reply text. They do not retry.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Completes a conversation for the given topic
    ///
    /// # Errors
    ///
    /// Returns `PayloadTooLarge` when the backend rejects the request size,
    /// `RateLimited` when throttled, and `Provider` for any other failure
    async fn complete(&self, topic: Topic, messages: &[Message]) -> Result<String>;

    /// Returns the model name used for a topic
    fn model_for(&self, topic: Topic) -> String;
}

/// Maps a non-success HTTP status and body to a provider error
///
/// # Examples
///
/// ```
/// use groqseeker::error::GroqSeekerError;
/// use groqseeker::providers::classify_status;
/// use reqwest::StatusCode;
///
/// let err = classify_status(StatusCode::PAYLOAD_TOO_LARGE, "too big");
/// assert!(matches!(err, GroqSeekerError::PayloadTooLarge(_)));
/// ```
pub fn classify_status(status: StatusCode, body: &str) -> GroqSeekerError {
    let detail = if body.trim().is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body.trim())
    };

    match status {
        StatusCode::PAYLOAD_TOO_LARGE => GroqSeekerError::PayloadTooLarge(detail),
        StatusCode::TOO_MANY_REQUESTS => GroqSeekerError::RateLimited(detail),
        _ => GroqSeekerError::Provider(detail),
    }
}
