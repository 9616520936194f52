use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use groqseeker::conversation::{Message, Topic};
use groqseeker::dispatch::MessageTransport;
use groqseeker::error::{GroqSeekerError, Result};
use groqseeker::providers::CompletionProvider;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Provider that echoes the last user message and records each context
#[allow(dead_code)]
#[derive(Default)]
pub struct EchoProvider {
    pub calls: Mutex<Vec<Vec<Message>>>,
}

#[async_trait]
impl CompletionProvider for EchoProvider {
    async fn complete(&self, topic: Topic, messages: &[Message]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        let last = messages
            .last()
            .ok_or_else(|| GroqSeekerError::Provider("empty context".to_string()))?;
        Ok(format!("{} heard: {}", topic, last.content))
    }

    fn model_for(&self, topic: Topic) -> String {
        format!("echo-{}", topic)
    }
}

/// Transport that keeps every sent message in memory
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryTransport {
    pub sent: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl MessageTransport for MemoryTransport {
    async fn send(&self, recipient: i64, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((recipient, text.to_string()));
        Ok(())
    }
}
