//! Test utilities for GroqSeeker
//!
//! This module provides temporary file helpers plus in-memory stand-ins for
//! the completion provider and the message transport.

use crate::conversation::{Message, Topic};
use crate::dispatch::MessageTransport;
use crate::error::{GroqSeekerError, Result};
use crate::providers::CompletionProvider;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Provider that replays scripted replies and records every call
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    failure: Option<Box<dyn Fn() -> GroqSeekerError + Send + Sync>>,
    calls: Mutex<Vec<(Topic, Vec<Message>)>>,
}

impl ScriptedProvider {
    /// Replies with each scripted string in turn
    pub fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with the error built by `failure`
    pub fn failing(failure: impl Fn() -> GroqSeekerError + Send + Sync + 'static) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            failure: Some(Box::new(failure)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every (topic, context) the provider was called with
    pub fn calls(&self) -> Vec<(Topic, Vec<Message>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, topic: Topic, messages: &[Message]) -> Result<String> {
        self.calls.lock().unwrap().push((topic, messages.to_vec()));
        if let Some(failure) = &self.failure {
            return Err(failure().into());
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GroqSeekerError::Provider("no scripted reply left".to_string()).into())
    }

    fn model_for(&self, topic: Topic) -> String {
        format!("scripted-{}", topic)
    }
}

/// Transport that records every message and can fail after N sends
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(i64, String)>>,
    fail_after: Option<usize>,
}

impl RecordingTransport {
    /// Accepts `successes` sends, then fails every later one
    pub fn failing_after(successes: usize) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_after: Some(successes),
        }
    }

    /// Every (recipient, text) successfully sent
    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageTransport for RecordingTransport {
    async fn send(&self, recipient: i64, text: &str) -> Result<()> {
        let mut sent = self.sent.lock().unwrap();
        if self.fail_after.is_some_and(|limit| sent.len() >= limit) {
            return Err(GroqSeekerError::Transport("simulated outage".to_string()).into());
        }
        sent.push((recipient, text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(GroqSeekerError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[tokio::test]
    async fn test_scripted_provider_runs_out() {
        let provider = ScriptedProvider::replying(["only"]);
        assert_eq!(provider.complete(Topic::Llama, &[]).await.unwrap(), "only");
        assert_error_contains(provider.complete(Topic::Llama, &[]).await, "no scripted reply");
        assert_eq!(provider.calls().len(), 2);
    }
}
