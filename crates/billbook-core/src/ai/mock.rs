//! Mock backend for testing
//!
//! Returns predictable replies without a running model server.

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::AIBackend;

/// Mock AI backend for testing
///
/// By default answers with `Mock answer: <question>`, where the question is
/// the text after the last `Question:` marker in the prompt. Can be
/// configured with a fixed reply or a failure.
#[derive(Clone, Debug)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Fixed reply, overriding the echo behaviour
    pub reply: Option<String>,
    /// Error message to fail every completion with
    pub failure: Option<String>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            reply: None,
            failure: None,
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Always reply with `reply`
    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Self::new()
        }
    }

    /// Fail every completion with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new()
        }
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String> {
        if let Some(ref message) = self.failure {
            return Err(Error::AiUnavailable(message.clone()));
        }
        if let Some(ref reply) = self.reply {
            return Ok(reply.clone());
        }

        let question = prompt
            .rsplit_once("Question:")
            .map(|(_, q)| q.trim())
            .unwrap_or("");
        Ok(format!("Mock answer: {}", question))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
