//! Telegram Bot API client
//!
//! Only the two calls the bot needs are implemented: `getUpdates` for
//! long-polling inbound messages and `sendMessage` for replies.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::TelegramConfig;
use crate::conversation::UserId;
use crate::dispatch::MessageTransport;
use crate::error::{GroqSeekerError, Result};

/// Extra time allowed on top of the long-poll timeout before the HTTP
/// request itself times out
const HTTP_TIMEOUT_MARGIN_SECS: u64 = 10;

/// Envelope every Bot API response is wrapped in
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

/// One entry returned by `getUpdates`
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update identifier
    pub update_id: i64,
    /// New incoming message, if this update carries one
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

/// Incoming message
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    /// Chat the message belongs to
    pub chat: Chat,
    /// Sender; absent for channel posts
    #[serde(default)]
    pub from: Option<TelegramUser>,
    /// Text content; absent for stickers, photos and the like
    #[serde(default)]
    pub text: Option<String>,
}

/// Chat identifier
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Chat id replies are sent to
    pub id: i64,
}

/// Message sender
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    /// User id sessions are keyed by
    pub id: UserId,
}

/// A text message ready for the handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Session key
    pub user: UserId,
    /// Where replies go
    pub chat_id: i64,
    /// Message text
    pub text: String,
}

impl Update {
    /// Extracts a text message from the update
    ///
    /// Returns `None` for updates without text. When the sender is unknown
    /// the chat id is used as the session key.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message?;
        let text = message.text?;
        let chat_id = message.chat.id;
        let user = message.from.map(|u| u.id).unwrap_or(chat_id);
        Some(InboundMessage {
            user,
            chat_id,
            text,
        })
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

/// Client for the Telegram Bot HTTP API
pub struct TelegramClient {
    client: Client,
    base_url: String,
    poll_timeout_seconds: u64,
}

impl TelegramClient {
    /// Creates a client for the bot identified by `token`
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &TelegramConfig, token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(
                config.poll_timeout_seconds + HTTP_TIMEOUT_MARGIN_SECS,
            ))
            .user_agent(concat!("groqseeker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                GroqSeekerError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", config.api_base.trim_end_matches('/'), token),
            poll_timeout_seconds: config.poll_timeout_seconds,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Long-polls for updates with id `>= offset`
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails or the API reports
    /// `ok: false`
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let response = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", self.poll_timeout_seconds.to_string()),
                ("allowed_updates", r#"["message"]"#.to_string()),
            ])
            .send()
            .await
            .map_err(|e| transport_error("getUpdates failed", e))?;

        let body: ApiResponse<Vec<Update>> = response
            .json()
            .await
            .map_err(|e| transport_error("Failed to parse getUpdates response", e))?;

        unwrap_api("getUpdates", body).map(Option::unwrap_or_default)
    }

    /// Sends a text message to a chat
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails or the API reports
    /// `ok: false`
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await
            .map_err(|e| transport_error("sendMessage failed", e))?;

        let body: ApiResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| transport_error("Failed to parse sendMessage response", e))?;

        unwrap_api("sendMessage", body).map(|_| ())
    }
}

/// Every Bot API URL embeds the token, so the URL is stripped from reqwest
/// errors before they are formatted.
fn transport_error(context: &str, error: reqwest::Error) -> GroqSeekerError {
    GroqSeekerError::Transport(format!("{}: {}", context, error.without_url()))
}

fn unwrap_api<T>(method: &str, body: ApiResponse<T>) -> Result<Option<T>> {
    if body.ok {
        Ok(body.result)
    } else {
        Err(GroqSeekerError::Transport(format!(
            "{} rejected: {}",
            method,
            body.description.unwrap_or_else(|| "no description".to_string())
        ))
        .into())
    }
}

#[async_trait]
impl MessageTransport for TelegramClient {
    async fn send(&self, recipient: i64, text: &str) -> Result<()> {
        self.send_message(recipient, text).await
    }
}
