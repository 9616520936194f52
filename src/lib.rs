//! GroqSeeker - Telegram bot library
//!
//! This library provides the core functionality for the GroqSeeker bot:
//! per-user conversation memory with token-budget truncation, chunked reply
//! delivery, and the collaborators that feed them.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `conversation`: Message types, token-bounded buffers and the per-user store
//! - `dispatch`: Chunked reply delivery over a message transport
//! - `providers`: Completion provider abstraction and the Groq implementation
//! - `predictor`: Regression model used by the `/predict` command
//! - `bot`: Command parsing, request handling and the Telegram run loop
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```
//! use groqseeker::conversation::{ConversationStore, Topic};
//!
//! # async fn example() -> groqseeker::error::Result<()> {
//! let store = ConversationStore::new(4000);
//! let context = store.begin_turn(42, Topic::Llama, "What is Rust?").await?;
//! assert_eq!(context.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod bot;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod dispatch;
pub mod error;
pub mod predictor;
pub mod providers;

// Re-export commonly used types
pub use config::Config;
pub use conversation::{ConversationStore, Message, Role, Topic};
pub use dispatch::{MessageTransport, ReplyDispatcher};
pub use error::{GroqSeekerError, Result};

#[cfg(test)]
pub mod test_utils;
