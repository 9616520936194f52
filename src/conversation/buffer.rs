//! Token-bounded conversation buffer
//!
//! A buffer holds the ordered transcript for one (user, topic) pair and keeps
//! a running character total so the token estimate never needs a rescan.

use crate::conversation::message::{Message, Role};

/// Default token budget for a single buffer
pub const DEFAULT_MAX_TOKENS: usize = 4000;

/// System notice inserted when the buffer cannot be brought under budget
pub const TRUNCATION_NOTICE: &str =
    "[Some earlier messages were removed to stay within token limits]";

/// Truncation never shrinks a buffer below this many messages
const RETAINED_FLOOR: usize = 2;

/// What a truncation pass did to the buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TruncationReport {
    /// Messages removed by this pass
    pub removed: usize,
    /// Whether the truncation notice was inserted by this pass
    pub notice_inserted: bool,
}

impl TruncationReport {
    /// Returns true if the pass changed the buffer
    pub fn changed(&self) -> bool {
        self.removed > 0 || self.notice_inserted
    }
}

/// Ordered transcript bounded by an estimated token budget
///
/// # Token Counting
///
/// Uses a fixed heuristic: total characters / 4 (integer division).
/// This is an approximation contract, not a tokenizer. The character total
/// is maintained incrementally on every push and removal, so the estimate is
/// always identical to a full rescan.
///
/// # Truncation Strategy
///
/// While the estimate exceeds the budget and more than two messages remain,
/// remove the oldest message. A leading system message is never removed;
/// the message right after it goes instead, down to `[system, latest]`.
///
/// If the budget is still exceeded once nothing more can be removed, a system
/// notice is inserted after the leading system message (or at the front).
#[derive(Debug, Clone)]
pub struct ConversationBuffer {
    messages: Vec<Message>,
    char_count: usize,
    max_tokens: usize,
}

impl ConversationBuffer {
    /// Creates an empty buffer with the given token budget
    ///
    /// # Examples
    ///
    /// ```
    /// use groqseeker::conversation::ConversationBuffer;
    ///
    /// let buffer = ConversationBuffer::new(4000);
    /// assert_eq!(buffer.token_count(), 0);
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new(max_tokens: usize) -> Self {
        Self {
            messages: Vec::new(),
            char_count: 0,
            max_tokens,
        }
    }

    /// Appends a message at the end of the transcript
    pub fn push(&mut self, message: Message) {
        self.char_count += message.char_len();
        self.messages.push(message);
    }

    /// Returns the messages in transcript order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the estimated token count (`characters / 4`)
    ///
    /// # Examples
    ///
    /// ```
    /// use groqseeker::conversation::{ConversationBuffer, Message};
    ///
    /// let mut buffer = ConversationBuffer::new(4000);
    /// buffer.push(Message::user("a".repeat(10)));
    /// buffer.push(Message::assistant("b".repeat(7)));
    /// assert_eq!(buffer.token_count(), 4);
    /// ```
    pub fn token_count(&self) -> usize {
        estimate_tokens(self.char_count)
    }

    /// Returns the running character total
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// Returns the token budget
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Returns the number of messages in the buffer
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the buffer has no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Removes every message
    pub fn clear(&mut self) {
        self.messages.clear();
        self.char_count = 0;
    }

    /// Brings the buffer under its token budget, mutating it in place
    ///
    /// Removal is permanent: later turns see the truncated history.
    pub fn truncate(&mut self) -> TruncationReport {
        let mut report = TruncationReport::default();

        while self.token_count() > self.max_tokens && self.messages.len() > RETAINED_FLOOR {
            let protected_head = usize::from(self.leading_system());
            let removed = self.messages.remove(protected_head);
            self.char_count -= removed.char_len();
            report.removed += 1;
        }

        if self.token_count() > self.max_tokens && !self.has_truncation_notice() {
            let index = usize::from(self.leading_system());
            let notice = Message::system(TRUNCATION_NOTICE);
            self.char_count += notice.char_len();
            self.messages.insert(index, notice);
            report.notice_inserted = true;
        }

        report
    }

    /// Recomputes the token estimate from scratch
    ///
    /// Always equal to [`ConversationBuffer::token_count`].
    pub fn rescan_tokens(&self) -> usize {
        estimate_tokens(self.messages.iter().map(Message::char_len).sum())
    }

    fn leading_system(&self) -> bool {
        self.messages
            .first()
            .map(|m| m.role == Role::System)
            .unwrap_or(false)
    }

    fn has_truncation_notice(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.role == Role::System && m.content == TRUNCATION_NOTICE)
    }
}

/// Estimates token count from a character total
fn estimate_tokens(chars: usize) -> usize {
    chars / 4
}
