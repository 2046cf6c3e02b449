//! Test utilities for billbook-core
//!
//! Provides a mock language model server that speaks both the
//! OpenAI-compatible chat completions API and the Ollama generate API.
//!
//! Replies echo the question found after the last `Question:` marker as
//! `Mock answer: <question>`. A question containing `EMPTY` produces an empty
//! reply, for exercising the "no text returned" path.

use axum::{
    extract::Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock language model server for testing
pub struct MockLlmServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockLlmServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat_completions))
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockLlmServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Reply the mock gives for a prompt
pub fn mock_answer(prompt: &str) -> String {
    let question = prompt
        .rsplit_once("Question:")
        .map(|(_, q)| q.trim())
        .unwrap_or("");
    if question.contains("EMPTY") {
        String::new()
    } else {
        format!("Mock answer: {}", question)
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

async fn handle_models() -> Json<serde_json::Value> {
    Json(json!({ "object": "list", "data": [{ "id": "gpt-4o-mini", "object": "model" }] }))
}

async fn handle_chat_completions(headers: HeaderMap, Json(request): Json<ChatRequest>) -> Response {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "));
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "message": "Missing API key" } })),
        )
            .into_response();
    }

    let prompt = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.as_str())
        .unwrap_or("");

    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": request.model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": mock_answer(prompt) },
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

async fn handle_tags() -> Json<serde_json::Value> {
    Json(json!({ "models": [{ "name": "llama3.2:latest" }] }))
}

async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<serde_json::Value> {
    Json(json!({
        "model": request.model,
        "response": mock_answer(&request.prompt),
        "done": true
    }))
}
