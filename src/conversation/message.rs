//! Message, role and topic types shared by the store and the providers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GroqSeekerError;

/// Platform-assigned user identifier
pub type UserId = i64;

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message typed by the user
    User,
    /// Reply produced by the remote model
    Assistant,
    /// Standing instruction or notice
    System,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::System => write!(f, "system"),
        }
    }
}

/// One role-tagged turn in a conversation buffer
///
/// Serializes to the `{"role": ..., "content": ...}` shape expected by
/// OpenAI-compatible chat completion endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use groqseeker::conversation::{Message, Role};
    ///
    /// let msg = Message::user("Hello, assistant!");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Creates a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Number of characters in the content, counted as Unicode scalar values
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Named chat context bucket, one per backing model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    /// Llama chat model
    Llama,
    /// DeepSeek chat model
    Deepseek,
}

impl Topic {
    /// All topics, in the order they are listed in help text
    pub const ALL: [Topic; 2] = [Topic::Llama, Topic::Deepseek];

    /// Lowercase command name for this topic
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llama => "llama",
            Self::Deepseek => "deepseek",
        }
    }

    /// Human-readable model family name used in help text
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Llama => "LLAMA",
            Self::Deepseek => "Deepseek",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = GroqSeekerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "llama" => Ok(Self::Llama),
            "deepseek" => Ok(Self::Deepseek),
            other => Err(GroqSeekerError::Config(format!(
                "Unknown topic: {}. Must be one of: llama, deepseek",
                other
            ))),
        }
    }
}
