// HTTP client for the chat endpoint.
//
// POSTs the whole conversation history as `{"messages": [...]}` and expects
// `{"message": "..."}` back. Every failure mode (transport, non-2xx status,
// unexpected body) comes back as a `ClientError`; the app loop decides what
// the user sees.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{Config, RequestParams};
use crate::conversation::Turn;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("endpoint returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode endpoint response: {0}")]
    Decode(String),

    #[error("request task ended without a result: {0}")]
    Aborted(String),
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [Turn],
    #[serde(flatten)]
    params: &'a RequestParams,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// ChatBackend
// ---------------------------------------------------------------------------

/// Anything that can turn a conversation history into an assistant reply.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, history: &[Turn]) -> Result<String, ClientError>;
}

/// `ChatBackend` that talks to the configured HTTP endpoint.
pub struct HttpBackend {
    http: reqwest::Client,
    url: String,
    params: RequestParams,
}

impl HttpBackend {
    pub fn new(url: impl Into<String>, params: RequestParams) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            params,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.endpoint.url.clone(), config.request.clone())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn complete(&self, history: &[Turn]) -> Result<String, ClientError> {
        let body = ChatRequest {
            messages: history,
            params: &self.params,
        };

        debug!(url = %self.url, turns = history.len(), "sending conversation");

        // `.json()` also sets `Content-Type: application/json`.
        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        let text = response.text().await.map_err(ClientError::Transport)?;
        let reply = parse_reply(&text)?;
        debug!(model = ?reply.model, usage = ?reply.usage, "reply received");
        Ok(reply.message)
    }
}

/// Parse the endpoint's JSON body into a reply.
fn parse_reply(body: &str) -> Result<ChatResponse, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
