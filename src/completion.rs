//! Chat-completion provider implementations.
//!
//! [`OpenAIChatProvider`] calls `POST {base_url}/chat/completions` with the
//! assembled [`Prompt`]; [`DisabledChatProvider`] reports the service as
//! unavailable. Build one with [`create_chat_provider`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use grounded_rag_core::completion::{ChatMessage, ChatProvider, Prompt};
use grounded_rag_core::{RagError, Result};

use crate::config::ChatConfig;
use crate::openai::{self, PROVIDER};

/// Returned when the model produces no message content.
pub const FALLBACK_ANSWER: &str = "I could not generate a response.";

pub struct DisabledChatProvider;

#[async_trait]
impl ChatProvider for DisabledChatProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _prompt: &Prompt) -> Result<String> {
        Err(RagError::ProviderUnavailable {
            provider: "disabled".into(),
            message: "chat provider is disabled".into(),
        })
    }
}

pub struct OpenAIChatProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f64,
    url: String,
}

impl OpenAIChatProvider {
    pub fn new(config: &ChatConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RagError::Configuration("API key must not be empty".into()));
        }
        if config.model.trim().is_empty() {
            return Err(RagError::Configuration(
                "chat.model required for OpenAI provider".into(),
            ));
        }

        Ok(Self {
            client: openai::build_client(config.timeout_secs)?,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            url: openai::endpoint(&config.base_url, "chat/completions"),
        })
    }

    pub fn from_env(config: &ChatConfig) -> Result<Self> {
        Self::new(config, openai::api_key_from_env()?)
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Extract the first choice's content, substituting [`FALLBACK_ANSWER`]
/// when the model returned nothing usable.
fn parse_completion_response(body: &str) -> std::result::Result<String, String> {
    let response: CompletionResponse = serde_json::from_str(body).map_err(|e| e.to_string())?;
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    Ok(content.unwrap_or_else(|| FALLBACK_ANSWER.to_string()))
}

#[async_trait]
impl ChatProvider for OpenAIChatProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        debug!(
            provider = PROVIDER,
            model = %self.model,
            messages = prompt.messages.len(),
            "requesting completion"
        );

        let body = CompletionRequest {
            model: &self.model,
            messages: &prompt.messages,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(openai::transport_error)?;

        if !response.status().is_success() {
            return Err(openai::status_error(response).await);
        }

        let status = response.status().as_u16();
        let text = response.text().await.map_err(openai::transport_error)?;
        parse_completion_response(&text).map_err(|e| openai::parse_error(status, e))
    }
}

/// Create the [`ChatProvider`] named by `config.provider`.
pub fn create_chat_provider(config: &ChatConfig) -> Result<Box<dyn ChatProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledChatProvider)),
        "openai" => Ok(Box::new(OpenAIChatProvider::from_env(config)?)),
        other => Err(RagError::Configuration(format!(
            "Unknown chat provider: {}",
            other
        ))),
    }
}
