//! Telegram bot for GroqSeeker
//!
//! This module wires the command handler to the Telegram transport: it
//! long-polls for updates, handles each text message in its own task, and
//! delivers the reply through the chunking dispatcher.

pub mod commands;
pub mod handler;
pub mod telegram;

pub use commands::{help_text, parse_bot_command, welcome_text, BotCommand};
pub use handler::BotHandler;
pub use telegram::{InboundMessage, TelegramClient, Update};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::dispatch::{MessageTransport, ReplyDispatcher};
use crate::error::Result;

/// Pause after a failed poll before trying again
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Handles one inbound message and delivers the reply
///
/// Returns the number of messages sent.
///
/// # Errors
///
/// Returns a transport error if delivery fails part-way
pub async fn respond(
    handler: &BotHandler,
    transport: &dyn MessageTransport,
    dispatcher: &ReplyDispatcher,
    inbound: InboundMessage,
) -> Result<usize> {
    let reply = handler.handle(inbound.user, &inbound.text).await;
    dispatcher.deliver(transport, inbound.chat_id, &reply).await
}

/// Long-polling bot run loop
pub struct Bot {
    client: Arc<TelegramClient>,
    handler: BotHandler,
    dispatcher: ReplyDispatcher,
}

impl Bot {
    /// Creates a bot over a Telegram client and a handler
    pub fn new(
        client: Arc<TelegramClient>,
        handler: BotHandler,
        dispatcher: ReplyDispatcher,
    ) -> Self {
        Self {
            client,
            handler,
            dispatcher,
        }
    }

    /// Polls for updates until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Polls for updates until `shutdown` completes
    ///
    /// Poll failures are logged and retried after a short delay; the delay
    /// is cut short by shutdown. Each text message is handled in its own task
    /// so slow completions for one user do not hold up anyone else.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!("GroqSeeker_Bot is running...");
        let mut offset: i64 = 0;

        loop {
            let updates = tokio::select! {
                _ = &mut shutdown => break,
                updates = self.client.get_updates(offset) => updates,
            };

            let updates = match updates {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!("Polling failed: {:#}", e);
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => continue,
                    }
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                if let Some(inbound) = update.into_inbound() {
                    self.spawn_response(inbound);
                }
            }
        }

        tracing::info!("Shutdown requested, stopping bot");
        Ok(())
    }

    fn spawn_response(&self, inbound: InboundMessage) {
        let client = Arc::clone(&self.client);
        let handler = self.handler.clone();
        let dispatcher = self.dispatcher;

        tokio::spawn(async move {
            let user = inbound.user;
            if let Err(e) = respond(&handler, &*client, &dispatcher, inbound).await {
                tracing::warn!(user, "Failed to deliver reply: {:#}", e);
            }
        });
    }
}
