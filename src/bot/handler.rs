//! Bot request handler
//!
//! Turns one inbound message from one user into one reply string. Every
//! request-level failure is converted to reply text here; nothing escapes.

use std::sync::Arc;

use crate::bot::commands::{help_text, parse_bot_command, welcome_text, BotCommand};
use crate::conversation::{
    ConversationStore, Topic, UserId, PAYLOAD_TOO_LARGE_NOTICE, PROVIDER_ERROR_PREFIX,
};
use crate::error::GroqSeekerError;
use crate::predictor::{parse_rate, Predictor};
use crate::providers::CompletionProvider;

/// Reply to `/reset`
pub const RESET_REPLY: &str = "Your chat history has been reset.";

/// Reply to `/predict` with an unparseable rate
pub const INVALID_RATE_REPLY: &str = "Invalid input. Please provide a valid number for USD/SGD.";

/// Reply to `/predict` with no argument and no remembered rate
pub const MISSING_RATE_REPLY: &str = "Please provide the USD/SGD rate after /predict.";

/// Handles bot commands against the shared store and collaborators
#[derive(Clone)]
pub struct BotHandler {
    store: Arc<ConversationStore>,
    provider: Arc<dyn CompletionProvider>,
    predictor: Arc<Predictor>,
}

impl BotHandler {
    /// Creates a handler over injected collaborators
    pub fn new(
        store: Arc<ConversationStore>,
        provider: Arc<dyn CompletionProvider>,
        predictor: Arc<Predictor>,
    ) -> Self {
        Self {
            store,
            provider,
            predictor,
        }
    }

    /// Returns the conversation store
    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Handles one inbound message and returns the reply text
    pub async fn handle(&self, user: UserId, text: &str) -> String {
        match parse_bot_command(text) {
            BotCommand::Start => welcome_text(),
            BotCommand::Help => help_text(),
            BotCommand::Chat { topic, text } => self.chat(user, topic, &text).await,
            BotCommand::Predict(arg) => self.predict(user, arg.as_deref()).await,
            BotCommand::Reset => {
                self.store.reset(user).await;
                RESET_REPLY.to_string()
            }
            BotCommand::Text(text) => {
                tracing::info!(user, "Echoing message: {}", text);
                format!("You said: {}", text)
            }
            BotCommand::Unknown(command) => {
                format!("Unknown command: {}\n\nType /help to see available commands.", command)
            }
        }
    }

    /// Sends a question to a topic's model, recording the exchange
    ///
    /// Failure replies are returned to the caller but never stored.
    pub async fn chat(&self, user: UserId, topic: Topic, text: &str) -> String {
        let context = match self.store.begin_turn(user, topic, text).await {
            Ok(context) => context,
            Err(e) => {
                if let Some(GroqSeekerError::EmptyInput { .. }) =
                    e.downcast_ref::<GroqSeekerError>()
                {
                    return format!("Please provide a question after /{}.", topic);
                }
                tracing::error!(user, %topic, "Failed to record question: {:#}", e);
                return format!("{}{}", PROVIDER_ERROR_PREFIX, e);
            }
        };

        tracing::info!(
            user,
            %topic,
            model = %self.provider.model_for(topic),
            context_messages = context.len(),
            "Requesting completion"
        );

        match self.provider.complete(topic, &context).await {
            Ok(reply) => {
                self.store.append_assistant_turn(user, topic, &reply).await;
                reply
            }
            Err(e) => match e.downcast_ref::<GroqSeekerError>() {
                Some(GroqSeekerError::PayloadTooLarge(detail)) => {
                    tracing::warn!(user, %topic, "Provider rejected payload: {}", detail);
                    PAYLOAD_TOO_LARGE_NOTICE.to_string()
                }
                _ => {
                    tracing::error!(user, %topic, "Completion failed: {:#}", e);
                    format!(
                        "{}The {} model could not answer: {}",
                        PROVIDER_ERROR_PREFIX, topic, e
                    )
                }
            },
        }
    }

    /// Predicts from a rate argument, or recalls the last rate without one
    pub async fn predict(&self, user: UserId, arg: Option<&str>) -> String {
        let Some(arg) = arg else {
            return match self.store.recall_last_numeric(user).await {
                Some(rate) => format!("Your last USD/SGD rate was: {}", format_rate(rate)),
                None => MISSING_RATE_REPLY.to_string(),
            };
        };

        match parse_rate(arg) {
            Ok(rate) => {
                self.store.remember_numeric(user, rate).await;
                self.predictor.predict_reply(rate)
            }
            Err(e) => {
                tracing::debug!(user, "Rejected prediction input: {:#}", e);
                INVALID_RATE_REPLY.to_string()
            }
        }
    }
}

/// Formats a rate the way users typed it, keeping `.0` on whole numbers
fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 && rate.abs() < 1e16 {
        format!("{:.1}", rate)
    } else {
        rate.to_string()
    }
}
