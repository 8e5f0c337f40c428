//! Chat-completion provider trait and prompt message types.
//!
//! The Context Assembler ([`crate::context`]) produces a [`Prompt`]; an
//! application-supplied [`ChatProvider`] turns it into answer text.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::models::{ConversationTurn, Role};

/// Role of a message sent to the completion backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl From<Role> for MessageRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => MessageRole::User,
            Role::Assistant => MessageRole::Assistant,
        }
    }
}

/// A single message in a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

impl From<&ConversationTurn> for ChatMessage {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            role: turn.role.into(),
            content: turn.content.clone(),
        }
    }
}

/// Ordered message list ready for a completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub messages: Vec<ChatMessage>,
}

/// An external chat-completion backend.
///
/// Fails with the same taxonomy as
/// [`EmbeddingProvider`](crate::embedding::EmbeddingProvider).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn model_name(&self) -> &str;

    async fn complete(&self, prompt: &Prompt) -> Result<String>;
}
