//! OpenAI-compatible backend implementation
//!
//! Works with OpenAI itself and with any server that implements the chat
//! completions API (vLLM, LocalAI, llama-server, Docker Model Runner).
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_API_KEY`: API key
//! - `OPENAI_BASE_URL`: Server URL, with or without a trailing `/v1`
//!   (default: https://api.openai.com)
//! - `OPENAI_MODEL`: Model name (default: gpt-4o-mini)
//!
//! At least one of `OPENAI_API_KEY` or `OPENAI_BASE_URL` must be set;
//! talking to api.openai.com without a key is pointless.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::AIBackend;

/// Default server when `OPENAI_BASE_URL` is not set
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Default model when `OPENAI_MODEL` is not set
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// OpenAI-compatible backend
///
/// Talks to `{base_url}/v1/chat/completions`.
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: normalize_base_url(base_url),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            api_key: Some(api_key.to_string()),
            ..Self::new(base_url, model)
        }
    }

    /// Create from environment variables
    ///
    /// Returns None unless `OPENAI_API_KEY` or `OPENAI_BASE_URL` is set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|u| !u.trim().is_empty());

        if api_key.is_none() && base_url.is_none() {
            return None;
        }

        let model =
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string());
        let base_url = base_url.unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        let mut backend = Self::new(&base_url, &model);
        backend.api_key = api_key;
        Some(backend)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key {
            Some(ref api_key) => builder.header("Authorization", format!("Bearer {}", api_key)),
            None => builder,
        }
    }
}

/// Server root without a trailing `/v1`
///
/// Accepts both `https://api.openai.com` and the SDK-style
/// `https://api.openai.com/v1`; request paths add `/v1/...` themselves.
fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/v1")
        .unwrap_or(trimmed)
        .to_string()
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Chat response message
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: Some(0.2),
            stream: false,
        };

        let req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        let response = self.with_auth(req_builder).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::AiUnavailable(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;
        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        debug!("OpenAI-compatible response: {}", content);

        Ok(content)
    }

    async fn health_check(&self) -> bool {
        let req_builder = self
            .http_client
            .get(format!("{}/v1/models", self.base_url));

        match self.with_auth(req_builder).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockLlmServer;

    #[test]
    fn test_backend_new() {
        let backend = OpenAICompatibleBackend::new("http://localhost:12434", "llama3.2");
        assert_eq!(backend.model(), "llama3.2");
        assert_eq!(backend.host(), "http://localhost:12434");
        assert!(backend.api_key.is_none());
    }

    #[test]
    fn test_backend_new_trims_trailing_slash() {
        let backend = OpenAICompatibleBackend::new("http://localhost:12434/", "llama3.2");
        assert_eq!(backend.host(), "http://localhost:12434");
    }

    #[test]
    fn test_backend_with_api_key() {
        let backend =
            OpenAICompatibleBackend::with_api_key(DEFAULT_OPENAI_BASE_URL, "gpt-4o", "sk-test123");
        assert_eq!(backend.model(), "gpt-4o");
        assert_eq!(backend.host(), "https://api.openai.com");
        assert_eq!(backend.api_key, Some("sk-test123".to_string()));
    }

    #[test]
    fn test_base_url_accepts_sdk_style_v1_suffix() {
        for url in [
            "https://api.openai.com/v1",
            "https://api.openai.com/v1/",
            "https://api.openai.com/",
        ] {
            let backend = OpenAICompatibleBackend::new(url, "gpt-4o-mini");
            assert_eq!(backend.host(), "https://api.openai.com", "{}", url);
        }
        let proxied = OpenAICompatibleBackend::new("http://proxy.local/openai/v1", "m");
        assert_eq!(proxied.host(), "http://proxy.local/openai");
    }

    #[tokio::test]
    async fn test_complete_with_v1_base_url() {
        let server = MockLlmServer::start().await;
        let base = format!("{}/v1", server.url());
        let backend = OpenAICompatibleBackend::with_api_key(&base, "gpt-4o-mini", "sk-test");

        let reply = backend
            .complete("system", "Question: anything due?")
            .await
            .unwrap();
        assert_eq!(reply, "Mock answer: anything due?");
    }

    #[test]
    fn test_chat_completion_request_serialization() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "Be brief".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: "Hello".to_string(),
                },
            ],
            temperature: None,
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Hello");
        assert!(json.get("temperature").is_none());
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_response_with_null_content() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert!(response.choices[0].message.content.is_none());
    }

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let server = MockLlmServer::start().await;
        let backend = OpenAICompatibleBackend::with_api_key(&server.url(), "gpt-4o-mini", "sk-x");

        let reply = backend
            .complete("system", "Bills:\n(none)\n\nQuestion: anything due?")
            .await
            .unwrap();
        assert_eq!(reply, "Mock answer: anything due?");
        assert!(backend.health_check().await);
    }

    #[tokio::test]
    async fn test_complete_surfaces_http_errors() {
        let server = MockLlmServer::start().await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "gpt-4o-mini");

        // The mock server rejects requests that carry no API key
        let err = backend.complete("system", "Question: hi").await.unwrap_err();
        match err {
            Error::AiUnavailable(message) => assert!(message.contains("401")),
            other => panic!("expected AiUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let backend = OpenAICompatibleBackend::new("http://127.0.0.1:1", "gpt-4o-mini");
        assert!(!backend.health_check().await);
    }
}
