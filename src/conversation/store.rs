//! Per-user conversation store
//!
//! The store maps each user id to a [`UserSession`] guarded by its own mutex.
//! Operations for different users only share the brief map lookup; operations
//! for the same user are serialized, so appends and truncation never
//! interleave within one session.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::conversation::buffer::{ConversationBuffer, DEFAULT_MAX_TOKENS};
use crate::conversation::message::{Message, Topic, UserId};
use crate::error::{GroqSeekerError, Result};

/// Reply shown when the provider rejects the conversation as too large
pub const PAYLOAD_TOO_LARGE_NOTICE: &str = "Your conversation is too long for the model to process. \
Send /reset to clear your chat history, or ask a shorter question.";

/// Prefix of replies produced from provider failures
///
/// Failure replies are built by the caller and never passed to
/// [`ConversationStore::append_assistant_turn`], so a model reply that
/// happens to start with this text is still stored.
pub const PROVIDER_ERROR_PREFIX: &str = "[provider error] ";

/// Returns true if `text` is the fixed payload-too-large reply
///
/// That reply is shown to the user but never stored as an assistant turn.
///
/// # Examples
///
/// ```
/// use groqseeker::conversation::{is_error_sentinel, PAYLOAD_TOO_LARGE_NOTICE};
///
/// assert!(is_error_sentinel(PAYLOAD_TOO_LARGE_NOTICE));
/// assert!(!is_error_sentinel("Paris is the capital of France."));
/// ```
pub fn is_error_sentinel(text: &str) -> bool {
    text == PAYLOAD_TOO_LARGE_NOTICE
}

/// State kept for one user
#[derive(Debug, Clone, Default)]
pub struct UserSession {
    buffers: HashMap<Topic, ConversationBuffer>,
    last_numeric_input: Option<f64>,
}

impl UserSession {
    /// Returns the buffer for a topic, if the user has chatted on it
    pub fn buffer(&self, topic: Topic) -> Option<&ConversationBuffer> {
        self.buffers.get(&topic)
    }

    /// Returns the last valid number supplied to the prediction command
    pub fn last_numeric_input(&self) -> Option<f64> {
        self.last_numeric_input
    }

    fn append_user_turn(&mut self, topic: Topic, text: &str, max_tokens: usize) -> Result<()> {
        if text.trim().is_empty() {
            return Err(GroqSeekerError::EmptyInput {
                topic: topic.to_string(),
            }
            .into());
        }

        self.buffers
            .entry(topic)
            .or_insert_with(|| ConversationBuffer::new(max_tokens))
            .push(Message::user(text));
        Ok(())
    }

    fn append_assistant_turn(&mut self, topic: Topic, text: &str) -> bool {
        if is_error_sentinel(text) {
            return false;
        }

        // No buffer means no user turn on this topic (or a reset since).
        match self.buffers.get_mut(&topic) {
            Some(buffer) => {
                buffer.push(Message::assistant(text));
                true
            }
            None => false,
        }
    }

    fn context(&mut self, user: UserId, topic: Topic) -> Vec<Message> {
        let Some(buffer) = self.buffers.get_mut(&topic) else {
            return Vec::new();
        };

        let report = buffer.truncate();
        if report.changed() {
            tracing::info!(
                user,
                %topic,
                removed = report.removed,
                notice_inserted = report.notice_inserted,
                tokens = buffer.token_count(),
                "Truncated conversation history"
            );
        }

        buffer.messages().to_vec()
    }
}

/// Process-wide store of user sessions
///
/// Inject one instance (behind an `Arc`) into every component that needs it.
/// State lives only as long as the process.
#[derive(Debug)]
pub struct ConversationStore {
    sessions: RwLock<HashMap<UserId, Arc<Mutex<UserSession>>>>,
    max_tokens: usize,
}

impl ConversationStore {
    /// Creates an empty store whose buffers use the given token budget
    pub fn new(max_tokens: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_tokens,
        }
    }

    /// Returns the token budget applied to every buffer
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    async fn session(&self, user: UserId) -> Arc<Mutex<UserSession>> {
        if let Some(session) = self.sessions.read().await.get(&user) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user).or_insert_with(|| {
            tracing::debug!(user, "Created user session");
            Arc::new(Mutex::new(UserSession::default()))
        });
        Arc::clone(session)
    }

    async fn existing_session(&self, user: UserId) -> Option<Arc<Mutex<UserSession>>> {
        self.sessions.read().await.get(&user).cloned()
    }

    /// Appends a user turn to the topic buffer, creating it if absent
    ///
    /// # Errors
    ///
    /// Returns `EmptyInput` if `text` is blank after trimming. Nothing is
    /// mutated in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use groqseeker::conversation::{ConversationStore, Topic};
    ///
    /// # async fn example() -> groqseeker::error::Result<()> {
    /// let store = ConversationStore::new(4000);
    /// store.append_user_turn(42, Topic::Llama, "Hello!").await?;
    /// assert_eq!(store.get_context(42, Topic::Llama).await.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn append_user_turn(&self, user: UserId, topic: Topic, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(GroqSeekerError::EmptyInput {
                topic: topic.to_string(),
            }
            .into());
        }

        let session = self.session(user).await;
        let mut session = session.lock().await;
        session.append_user_turn(topic, text, self.max_tokens)
    }

    /// Appends an assistant turn to an existing topic buffer
    ///
    /// Returns whether the turn was stored. Nothing is stored if `text` is an
    /// error sentinel, or if the buffer does not exist (for example because
    /// the user reset while the completion was in flight).
    pub async fn append_assistant_turn(&self, user: UserId, topic: Topic, text: &str) -> bool {
        let Some(session) = self.existing_session(user).await else {
            tracing::debug!(user, %topic, "No session, assistant reply not stored");
            return false;
        };
        let mut session = session.lock().await;
        let stored = session.append_assistant_turn(topic, text);
        if !stored {
            tracing::debug!(user, %topic, "Assistant reply not stored in history");
        }
        stored
    }

    /// Returns the truncated buffer for a topic
    ///
    /// Truncation is applied to the stored buffer before the copy is taken.
    /// Returns an empty vector if the user has never chatted on the topic.
    pub async fn get_context(&self, user: UserId, topic: Topic) -> Vec<Message> {
        match self.existing_session(user).await {
            Some(session) => session.lock().await.context(user, topic),
            None => Vec::new(),
        }
    }

    /// Appends a user turn and takes the truncated context atomically
    ///
    /// # Errors
    ///
    /// Returns `EmptyInput` if `text` is blank after trimming.
    pub async fn begin_turn(&self, user: UserId, topic: Topic, text: &str) -> Result<Vec<Message>> {
        if text.trim().is_empty() {
            return Err(GroqSeekerError::EmptyInput {
                topic: topic.to_string(),
            }
            .into());
        }

        let session = self.session(user).await;
        let mut session = session.lock().await;
        session.append_user_turn(topic, text, self.max_tokens)?;
        Ok(session.context(user, topic))
    }

    /// Clears every topic buffer for the user
    ///
    /// The remembered numeric input survives a reset.
    pub async fn reset(&self, user: UserId) {
        if let Some(session) = self.existing_session(user).await {
            session.lock().await.buffers.clear();
            tracing::info!(user, "Reset conversation history");
        }
    }

    /// Returns the last number the user supplied to the prediction command
    pub async fn recall_last_numeric(&self, user: UserId) -> Option<f64> {
        match self.existing_session(user).await {
            Some(session) => session.lock().await.last_numeric_input,
            None => None,
        }
    }

    /// Remembers a valid number supplied to the prediction command
    pub async fn remember_numeric(&self, user: UserId, value: f64) {
        let session = self.session(user).await;
        session.lock().await.last_numeric_input = Some(value);
    }

    /// Number of messages in a topic buffer, `None` if it does not exist
    pub async fn buffer_len(&self, user: UserId, topic: Topic) -> Option<usize> {
        let session = self.existing_session(user).await?;
        let session = session.lock().await;
        session.buffer(topic).map(ConversationBuffer::len)
    }

    /// Number of users with a session
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOKENS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::buffer::TRUNCATION_NOTICE;
    use crate::conversation::message::Role;

    #[tokio::test]
    async fn test_context_preserves_append_order() {
        let store = ConversationStore::default();
        for text in ["one", "two", "three"] {
            store.append_user_turn(1, Topic::Llama, text).await.unwrap();
        }

        let context = store.get_context(1, Topic::Llama).await;
        let contents: Vec<_> = context.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert!(context.iter().all(|m| m.role == Role::User));
    }

    #[tokio::test]
    async fn test_empty_input_rejected_without_mutation() {
        let store = ConversationStore::default();
        let result = store.append_user_turn(1, Topic::Llama, "   \n\t").await;

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GroqSeekerError>(),
            Some(GroqSeekerError::EmptyInput { .. })
        ));
        assert_eq!(store.buffer_len(1, Topic::Llama).await, None);
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_buffers_created_lazily_per_topic() {
        let store = ConversationStore::default();
        store.append_user_turn(1, Topic::Llama, "hi").await.unwrap();

        assert_eq!(store.buffer_len(1, Topic::Llama).await, Some(1));
        assert_eq!(store.buffer_len(1, Topic::Deepseek).await, None);
        assert!(store.get_context(1, Topic::Deepseek).await.is_empty());
    }

    #[tokio::test]
    async fn test_topics_are_independent() {
        let store = ConversationStore::default();
        store.append_user_turn(1, Topic::Llama, "llama q").await.unwrap();
        store
            .append_user_turn(1, Topic::Deepseek, "deepseek q")
            .await
            .unwrap();

        assert_eq!(store.get_context(1, Topic::Llama).await[0].content, "llama q");
        assert_eq!(
            store.get_context(1, Topic::Deepseek).await[0].content,
            "deepseek q"
        );
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let store = ConversationStore::default();
        store.append_user_turn(1, Topic::Llama, "from one").await.unwrap();
        store.append_user_turn(2, Topic::Llama, "from two").await.unwrap();

        assert_eq!(store.get_context(1, Topic::Llama).await.len(), 1);
        assert_eq!(store.get_context(2, Topic::Llama).await.len(), 1);
        assert_eq!(store.session_count().await, 2);
    }

    #[tokio::test]
    async fn test_assistant_sentinel_not_stored() {
        let store = ConversationStore::default();
        store.append_user_turn(1, Topic::Llama, "question").await.unwrap();

        assert!(
            !store
                .append_assistant_turn(1, Topic::Llama, PAYLOAD_TOO_LARGE_NOTICE)
                .await
        );
        assert!(store.append_assistant_turn(1, Topic::Llama, "answer").await);

        let context = store.get_context(1, Topic::Llama).await;
        assert_eq!(context.len(), 2);
        assert_eq!(context[1], Message::assistant("answer"));
    }

    #[tokio::test]
    async fn test_model_reply_with_error_like_prefix_is_stored() {
        let store = ConversationStore::default();
        store.append_user_turn(1, Topic::Llama, "quote it").await.unwrap();

        let reply = format!("{}is what the log said", PROVIDER_ERROR_PREFIX);
        assert!(store.append_assistant_turn(1, Topic::Llama, &reply).await);
        assert_eq!(store.buffer_len(1, Topic::Llama).await, Some(2));
    }

    #[tokio::test]
    async fn test_assistant_turn_after_reset_is_dropped() {
        let store = ConversationStore::default();
        store.append_user_turn(1, Topic::Llama, "question").await.unwrap();
        store.reset(1).await;

        assert!(!store.append_assistant_turn(1, Topic::Llama, "late answer").await);
        assert_eq!(store.buffer_len(1, Topic::Llama).await, None);

        // Never chatted on this topic or at all
        assert!(!store.append_assistant_turn(1, Topic::Deepseek, "x").await);
        assert!(!store.append_assistant_turn(2, Topic::Llama, "x").await);
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_notice_led_buffer_shrinks_to_two_messages() {
        let store = ConversationStore::new(10);
        store
            .append_user_turn(1, Topic::Llama, &"a".repeat(160))
            .await
            .unwrap();
        let first = store.get_context(1, Topic::Llama).await;
        assert_eq!(first[0], Message::system(TRUNCATION_NOTICE));

        store.append_assistant_turn(1, Topic::Llama, &"b".repeat(8)).await;
        store.append_user_turn(1, Topic::Llama, &"c".repeat(8)).await.unwrap();

        let context = store.get_context(1, Topic::Llama).await;
        assert_eq!(
            context,
            vec![Message::system(TRUNCATION_NOTICE), Message::user("c".repeat(8))]
        );
    }

    #[tokio::test]
    async fn test_truncation_notice_injected_at_floor() {
        let store = ConversationStore::new(10);
        store
            .append_user_turn(1, Topic::Llama, &"a".repeat(160))
            .await
            .unwrap();
        store
            .append_user_turn(1, Topic::Llama, &"b".repeat(160))
            .await
            .unwrap();

        let context = store.get_context(1, Topic::Llama).await;
        assert_eq!(context.len(), 3);
        assert_eq!(context[0], Message::system(TRUNCATION_NOTICE));
        assert_eq!(context[1].content, "a".repeat(160));
        assert_eq!(context[2].content, "b".repeat(160));
    }

    #[tokio::test]
    async fn test_truncation_is_permanent() {
        let store = ConversationStore::new(10);
        store
            .append_user_turn(1, Topic::Llama, &"a".repeat(80))
            .await
            .unwrap();
        store.append_assistant_turn(1, Topic::Llama, "ok").await;
        store.append_user_turn(1, Topic::Llama, "short").await.unwrap();

        let first = store.get_context(1, Topic::Llama).await;
        assert_eq!(first.len(), 2);
        assert_eq!(store.buffer_len(1, Topic::Llama).await, Some(2));
    }

    #[tokio::test]
    async fn test_begin_turn_appends_and_returns_context() {
        let store = ConversationStore::default();
        let context = store.begin_turn(1, Topic::Deepseek, "hello").await.unwrap();
        assert_eq!(context, vec![Message::user("hello")]);

        assert!(store.begin_turn(1, Topic::Deepseek, "").await.is_err());
        assert_eq!(store.buffer_len(1, Topic::Deepseek).await, Some(1));
    }

    #[tokio::test]
    async fn test_reset_keeps_numeric_input() {
        let store = ConversationStore::default();
        store.append_user_turn(1, Topic::Llama, "hi").await.unwrap();
        store.append_user_turn(1, Topic::Deepseek, "hi").await.unwrap();
        store.remember_numeric(1, 1.35).await;

        store.reset(1).await;

        assert_eq!(store.buffer_len(1, Topic::Llama).await, None);
        assert_eq!(store.buffer_len(1, Topic::Deepseek).await, None);
        assert_eq!(store.recall_last_numeric(1).await, Some(1.35));
    }

    #[tokio::test]
    async fn test_recall_without_session() {
        let store = ConversationStore::default();
        assert_eq!(store.recall_last_numeric(99).await, None);
        store.reset(99).await;
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_appends_for_one_user_are_all_kept() {
        let store = Arc::new(ConversationStore::default());
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .append_user_turn(7, Topic::Llama, &format!("msg {}", i))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.buffer_len(7, Topic::Llama).await, Some(50));
    }
}
