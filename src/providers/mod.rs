//! Provider module for GroqSeeker
//!
//! This module contains the completion provider abstraction and the Groq
//! implementation that serves every topic.

pub mod base;
pub mod groq;

pub use base::{classify_status, CompletionProvider};
pub use groq::GroqProvider;

use crate::config::ProviderConfig;
use crate::error::Result;

/// Create the completion provider described by the configuration
///
/// # Errors
///
/// Returns `MissingCredentials` if no Groq API key is configured, or an
/// error if the HTTP client cannot be built
pub fn create_provider(config: &crate::config::Config) -> Result<Box<dyn CompletionProvider>> {
    let api_key = config.require_groq_api_key()?;
    create_groq_provider(&config.provider, api_key)
}

fn create_groq_provider(
    config: &ProviderConfig,
    api_key: &str,
) -> Result<Box<dyn CompletionProvider>> {
    Ok(Box::new(GroqProvider::new(config.groq.clone(), api_key)?))
}
