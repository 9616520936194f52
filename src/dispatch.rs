//! Chunked reply delivery
//!
//! Messaging transports cap the size of a single message. The dispatcher
//! splits an oversized reply into consecutive, exactly-sized chunks and sends
//! them in order, labelled `Part i/n`.

use async_trait::async_trait;

use crate::error::{GroqSeekerError, Result};

/// Default maximum characters per outbound message
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 4000;

/// Delivery of one chunk of text to one recipient
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Sends `text` to `recipient`
    ///
    /// # Errors
    ///
    /// Returns a transport error if the message could not be delivered
    async fn send(&self, recipient: i64, text: &str) -> Result<()>;
}

/// Splits text into consecutive chunks of at most `max_chunk_size` characters
///
/// Characters are Unicode scalar values. Chunks are exact slices: no
/// trimming and no re-wrapping at word boundaries. Text that fits is returned
/// as a single chunk, including the empty string.
///
/// # Examples
///
/// ```
/// use groqseeker::dispatch::split_reply;
///
/// assert_eq!(split_reply("abcdefg", 3), vec!["abc", "def", "g"]);
/// assert_eq!(split_reply("abc", 3), vec!["abc"]);
/// ```
pub fn split_reply(text: &str, max_chunk_size: usize) -> Vec<String> {
    let max_chunk_size = max_chunk_size.max(1);
    if text.chars().count() <= max_chunk_size {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chunk_size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Sends replies through a transport without losing or reordering content
#[derive(Debug, Clone, Copy)]
pub struct ReplyDispatcher {
    max_chunk_size: usize,
}

impl ReplyDispatcher {
    /// Creates a dispatcher with the given per-message character limit
    pub fn new(max_chunk_size: usize) -> Self {
        Self {
            max_chunk_size: max_chunk_size.max(1),
        }
    }

    /// Returns the per-message character limit
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Delivers `text` to `recipient`, chunking if necessary
    ///
    /// Returns the number of messages sent.
    ///
    /// # Errors
    ///
    /// Stops at the first failed send and returns a `Transport` error naming
    /// the part that failed. Parts already sent are not retracted.
    pub async fn deliver(
        &self,
        transport: &dyn MessageTransport,
        recipient: i64,
        text: &str,
    ) -> Result<usize> {
        let chunks = split_reply(text, self.max_chunk_size);
        let total = chunks.len();

        if total == 1 {
            transport.send(recipient, text).await.map_err(|e| {
                GroqSeekerError::Transport(format!("failed to send reply: {:#}", e))
            })?;
            return Ok(1);
        }

        tracing::debug!(recipient, parts = total, "Delivering reply in parts");

        for (index, chunk) in chunks.iter().enumerate() {
            let part = index + 1;
            let message = format!("Part {}/{}:\n\n{}", part, total, chunk);
            if let Err(e) = transport.send(recipient, &message).await {
                tracing::warn!(recipient, part, total, "Reply delivery interrupted: {:#}", e);
                return Err(GroqSeekerError::Transport(format!(
                    "failed to send part {}/{}: {:#}",
                    part, total, e
                ))
                .into());
            }
        }

        Ok(total)
    }
}

impl Default for ReplyDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHUNK_SIZE)
    }
}
