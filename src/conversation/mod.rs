//! Conversation module for GroqSeeker
//!
//! This module contains the per-user conversation memory: message types,
//! token-bounded buffers with their truncation policy, and the keyed store
//! that owns every user's session.

pub mod buffer;
pub mod message;
pub mod store;

pub use buffer::{ConversationBuffer, TruncationReport, DEFAULT_MAX_TOKENS, TRUNCATION_NOTICE};
pub use message::{Message, Role, Topic, UserId};
pub use store::{
    is_error_sentinel, ConversationStore, UserSession, PAYLOAD_TOO_LARGE_NOTICE,
    PROVIDER_ERROR_PREFIX,
};
