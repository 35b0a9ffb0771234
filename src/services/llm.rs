use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::config::LlmSettings;

/// Errors that can occur when invoking the generative backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A role-tagged message sent to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

/// Backend output, untouched
///
/// `content` may be a string, a list of parts or a keyed structure depending
/// on the provider; see `core::normalize`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub content: Value,
}

impl ChatReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { content: Value::String(text.into()) }
    }
}

/// A generative backend that answers a sequence of chat messages
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<ChatReply, BackendError>;
}

/// OpenAI-compatible chat-completions client
pub struct OpenAiChatClient {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: Client,
}

impl OpenAiChatClient {
    pub fn new(settings: &LlmSettings, api_key: &str) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: settings.api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            client,
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiChatClient {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<ChatReply, BackendError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": messages,
        });

        tracing::debug!("Invoking chat backend {} with {} messages", self.model, messages.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(BackendError::ApiError(format!("{}: {}", status, body)));
        }

        let json: Value = response.json().await?;
        let content = parse_chat_response(json)?;

        Ok(ChatReply { content })
    }
}

fn parse_chat_response(json: Value) -> Result<Value, BackendError> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .cloned()
        .ok_or_else(|| BackendError::InvalidResponse("Missing choices[0].message.content".into()))
}

/// Process-wide backend handle, built on first use
///
/// Concurrent first callers share one construction.
pub struct LazyChatBackend {
    settings: LlmSettings,
    api_key: String,
    client: OnceCell<OpenAiChatClient>,
}

impl LazyChatBackend {
    /// `None` when no credential is configured
    pub fn from_settings(settings: &LlmSettings) -> Option<Arc<dyn ChatBackend>> {
        let api_key = settings.credential()?.to_string();

        tracing::info!("Generative backend configured (model: {})", settings.model);

        Some(Arc::new(Self {
            settings: settings.clone(),
            api_key,
            client: OnceCell::new(),
        }))
    }
}

#[async_trait]
impl ChatBackend for LazyChatBackend {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<ChatReply, BackendError> {
        let client = self
            .client
            .get_or_try_init(|| async { OpenAiChatClient::new(&self.settings, &self.api_key) })
            .await?;

        client.invoke(messages).await
    }
}
