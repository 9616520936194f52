//! Configuration management for GroqSeeker
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::conversation::{Topic, DEFAULT_MAX_TOKENS};
use crate::dispatch::DEFAULT_MAX_CHUNK_SIZE;
use crate::error::{GroqSeekerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for GroqSeeker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Conversation memory settings
    #[serde(default)]
    pub conversation: ConversationConfig,
    /// Telegram transport settings
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Regression predictor settings
    #[serde(default)]
    pub predictor: PredictorConfig,
}

/// Provider configuration
///
/// Both topics are served by the Groq OpenAI-compatible API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Groq configuration
    #[serde(default)]
    pub groq: GroqConfig,
}

/// Groq provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// API base URL, without the `/chat/completions` suffix
    #[serde(default = "default_groq_api_base")]
    pub api_base: String,

    /// API key; usually supplied through `GROQ_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model used for the `llama` topic
    #[serde(default = "default_llama_model")]
    pub llama_model: String,

    /// Model used for the `deepseek` topic
    #[serde(default = "default_deepseek_model")]
    pub deepseek_model: String,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

fn default_groq_api_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llama_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_deepseek_model() -> String {
    "deepseek-r1-distill-llama-70b".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

impl GroqConfig {
    /// Returns the model configured for a topic
    pub fn model_for(&self, topic: Topic) -> &str {
        match topic {
            Topic::Llama => &self.llama_model,
            Topic::Deepseek => &self.deepseek_model,
        }
    }
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_base: default_groq_api_base(),
            api_key: None,
            llama_model: default_llama_model(),
            deepseek_model: default_deepseek_model(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

/// Conversation memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Estimated token budget per (user, topic) buffer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Maximum characters per outbound message
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

fn default_max_chunk_size() -> usize {
    DEFAULT_MAX_CHUNK_SIZE
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            max_chunk_size: default_max_chunk_size(),
        }
    }
}

/// Telegram Bot API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,

    /// Bot token; usually supplied through `TELEGRAM_BOT_TOKEN`
    #[serde(default, skip_serializing)]
    pub bot_token: Option<String>,

    /// Long-poll timeout passed to `getUpdates` (seconds)
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u64,
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_telegram_api_base(),
            bot_token: None,
            poll_timeout_seconds: default_poll_timeout(),
        }
    }
}

/// Regression predictor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Path to the JSON model artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/dbs.json")
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GroqSeekerError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| GroqSeekerError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            self.provider.groq.api_key = Some(key);
        }

        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }

        if let Ok(api_base) = std::env::var("GROQSEEKER_GROQ_API_BASE") {
            self.provider.groq.api_base = api_base;
        }

        if let Ok(model) = std::env::var("GROQSEEKER_LLAMA_MODEL") {
            self.provider.groq.llama_model = model;
        }

        if let Ok(model) = std::env::var("GROQSEEKER_DEEPSEEK_MODEL") {
            self.provider.groq.deepseek_model = model;
        }

        if let Ok(max_tokens) = std::env::var("GROQSEEKER_MAX_TOKENS") {
            if let Ok(value) = max_tokens.parse() {
                self.conversation.max_tokens = value;
            } else {
                tracing::warn!("Invalid GROQSEEKER_MAX_TOKENS: {}", max_tokens);
            }
        }

        if let Ok(chunk) = std::env::var("GROQSEEKER_MAX_CHUNK_SIZE") {
            if let Ok(value) = chunk.parse() {
                self.conversation.max_chunk_size = value;
            } else {
                tracing::warn!("Invalid GROQSEEKER_MAX_CHUNK_SIZE: {}", chunk);
            }
        }

        if let Ok(model_path) = std::env::var("GROQSEEKER_MODEL_PATH") {
            tracing::debug!(model_path = %model_path, "Env override: GROQSEEKER_MODEL_PATH");
            self.predictor.model_path = PathBuf::from(model_path);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(model_path) = &cli.model_path {
            self.predictor.model_path = model_path.clone();
        }
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any value is out of range or a URL does not parse
    pub fn validate(&self) -> Result<()> {
        if self.conversation.max_tokens == 0 {
            return Err(GroqSeekerError::Config(
                "conversation.max_tokens must be greater than 0".to_string(),
            )
            .into());
        }

        if self.conversation.max_chunk_size == 0 {
            return Err(GroqSeekerError::Config(
                "conversation.max_chunk_size must be greater than 0".to_string(),
            )
            .into());
        }

        if self.provider.groq.llama_model.trim().is_empty()
            || self.provider.groq.deepseek_model.trim().is_empty()
        {
            return Err(
                GroqSeekerError::Config("provider model names cannot be empty".to_string()).into(),
            );
        }

        if self.provider.groq.timeout_seconds == 0 {
            return Err(GroqSeekerError::Config(
                "provider.groq.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        for (name, value) in [
            ("provider.groq.api_base", &self.provider.groq.api_base),
            ("telegram.api_base", &self.telegram.api_base),
        ] {
            url::Url::parse(value).map_err(|e| {
                GroqSeekerError::Config(format!("{} is not a valid URL ({}): {}", name, value, e))
            })?;
        }

        Ok(())
    }

    /// Returns the Groq API key or a startup diagnostic
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` if no key is configured
    pub fn require_groq_api_key(&self) -> Result<&str> {
        present(self.provider.groq.api_key.as_deref()).ok_or_else(|| {
            GroqSeekerError::MissingCredentials(
                "GROQ_API_KEY environment variable not set".to_string(),
            )
            .into()
        })
    }

    /// Returns the Telegram bot token or a startup diagnostic
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` if no token is configured
    pub fn require_telegram_token(&self) -> Result<&str> {
        present(self.telegram.bot_token.as_deref()).ok_or_else(|| {
            GroqSeekerError::MissingCredentials(
                "TELEGRAM_BOT_TOKEN environment variable not set".to_string(),
            )
            .into()
        })
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.conversation.max_tokens, 4000);
        assert_eq!(config.conversation.max_chunk_size, 4000);
        assert_eq!(config.provider.groq.llama_model, "llama-3.1-8b-instant");
        assert_eq!(
            config.provider.groq.model_for(Topic::Deepseek),
            "deepseek-r1-distill-llama-70b"
        );
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_max_tokens() {
        let mut config = Config::default();
        config.conversation.max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_chunk_size() {
        let mut config = Config::default();
        config.conversation.max_chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = Config::default();
        config.telegram.api_base = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("telegram.api_base"));
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
provider:
  groq:
    llama_model: llama-3.3-70b-versatile
conversation:
  max_tokens: 2000
predictor:
  model_path: /srv/models/dbs.json
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.groq.llama_model, "llama-3.3-70b-versatile");
        assert_eq!(
            config.provider.groq.deepseek_model,
            "deepseek-r1-distill-llama-70b"
        );
        assert_eq!(config.conversation.max_tokens, 2000);
        assert_eq!(config.conversation.max_chunk_size, 4000);
        assert_eq!(
            config.predictor.model_path,
            PathBuf::from("/srv/models/dbs.json")
        );
    }

    #[test]
    fn test_credentials_not_serialized() {
        let mut config = Config::default();
        config.provider.groq.api_key = Some("secret-key".to_string());
        config.telegram.bot_token = Some("secret-token".to_string());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("secret"));
    }

    #[test]
    fn test_missing_credentials() {
        let config = Config::default();
        assert!(config.require_groq_api_key().is_err());

        let mut config = Config::default();
        config.telegram.bot_token = Some("  ".to_string());
        let err = config.require_telegram_token().unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("GROQ_API_KEY", "gsk_test");
        std::env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
        std::env::set_var("GROQSEEKER_MAX_TOKENS", "1234");
        std::env::set_var("GROQSEEKER_MAX_CHUNK_SIZE", "not-a-number");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("GROQ_API_KEY");
        std::env::remove_var("TELEGRAM_BOT_TOKEN");
        std::env::remove_var("GROQSEEKER_MAX_TOKENS");
        std::env::remove_var("GROQSEEKER_MAX_CHUNK_SIZE");

        assert_eq!(config.require_groq_api_key().unwrap(), "gsk_test");
        assert_eq!(config.require_telegram_token().unwrap(), "123:abc");
        assert_eq!(config.conversation.max_tokens, 1234);
        assert_eq!(config.conversation.max_chunk_size, 4000);
    }
}
