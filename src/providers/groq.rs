//! Groq provider implementation for GroqSeeker
//!
//! This module implements `CompletionProvider` against Groq's
//! OpenAI-compatible chat completions endpoint. Each topic maps to one
//! configured model.

use crate::config::GroqConfig;
use crate::conversation::{Message, Topic};
use crate::error::{GroqSeekerError, Result};
use crate::providers::{classify_status, CompletionProvider};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Groq chat completions provider
///
/// # Examples
///
/// ```no_run
/// use groqseeker::config::GroqConfig;
/// use groqseeker::conversation::{Message, Topic};
/// use groqseeker::providers::{CompletionProvider, GroqProvider};
///
/// # async fn example() -> groqseeker::error::Result<()> {
/// let provider = GroqProvider::new(GroqConfig::default(), "gsk_example")?;
/// let reply = provider
///     .complete(Topic::Llama, &[Message::user("Hello!")])
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct GroqProvider {
    client: Client,
    config: GroqConfig,
    api_key: String,
}

/// Request body for `/chat/completions`
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

/// Response body from `/chat/completions`
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl GroqProvider {
    /// Create a new Groq provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: GroqConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("groqseeker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                GroqSeekerError::Provider(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!(
            "Initialized Groq provider: api_base={}, llama_model={}, deepseek_model={}",
            config.api_base,
            config.llama_model,
            config.deepseek_model
        );

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    async fn complete(&self, topic: Topic, messages: &[Message]) -> Result<String> {
        let model = self.config.model_for(topic);
        let request = ChatCompletionRequest { model, messages };

        tracing::debug!(
            %topic,
            model,
            messages = messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Groq request failed: {}", e);
                GroqSeekerError::Provider(format!("Groq request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Groq returned error {}: {}", status, error_text);
            return Err(classify_status(status, &error_text).into());
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Groq response: {}", e);
            GroqSeekerError::Provider(format!("Failed to parse Groq response: {}", e))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                GroqSeekerError::Provider("Groq response contained no choices".to_string())
            })?;

        tracing::debug!(%topic, chars = content.chars().count(), "Received completion");
        Ok(content)
    }

    fn model_for(&self, topic: Topic) -> String {
        self.config.model_for(topic).to_string()
    }
}
