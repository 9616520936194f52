//! Error types for GroqSeeker
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for GroqSeeker operations
///
/// Request-level variants (`EmptyInput` through `Transport`) are caught at the
/// bot handler boundary and turned into reply text. The remaining variants
/// cover startup and plumbing failures.
#[derive(Error, Debug)]
pub enum GroqSeekerError {
    /// User submitted blank text to a chat topic
    #[error("Empty input for topic {topic}")]
    EmptyInput {
        /// Topic the blank text was sent to
        topic: String,
    },

    /// Provider rejected the request because the payload was too large (HTTP 413)
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Provider rate limit hit (HTTP 429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Any other completion failure
    #[error("Provider error: {0}")]
    Provider(String),

    /// Numeric parse failure on the prediction command input
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    /// Regression artifact missing or not loaded
    #[error("Prediction model unavailable")]
    ModelUnavailable,

    /// Message transport failure while delivering a reply
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing credential required at startup
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for GroqSeeker operations
///
/// Uses `anyhow::Error` so context can be attached while propagating.
/// Callers that need to branch on the failure kind use
/// `err.downcast_ref::<GroqSeekerError>()`.
pub type Result<T> = anyhow::Result<T>;
