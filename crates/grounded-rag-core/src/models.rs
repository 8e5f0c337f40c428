//! Core data models that flow through ingestion and retrieval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An indexable unit of document text paired with its embedding vector.
///
/// Chunks are immutable once created. Re-ingestion replaces the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Originating document, e.g. `data/handbook/leave.md`. Not unique.
    pub source: String,
    /// Literal chunk content; never blank after trimming.
    pub text: String,
    /// Embedding of `text`; every stored chunk shares one dimension.
    pub vector: Vec<f32>,
    /// Informational only.
    pub created_at: DateTime<Utc>,
}

impl Chunk {
    pub fn new(source: impl Into<String>, text: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
            vector,
            created_at: Utc::now(),
        }
    }

    pub fn dims(&self) -> usize {
        self.vector.len()
    }
}

/// A chunk paired with its cosine similarity to a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub chunk: Chunk,
    /// Cosine similarity in `[-1.0, 1.0]`.
    pub score: f32,
}

/// Speaker of a prior conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!(
                "unknown conversation role '{}': expected user or assistant",
                other
            )),
        }
    }
}

/// One prior message in a conversation, supplied read-only by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_values_only() {
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert_eq!("assistant".parse::<Role>(), Ok(Role::Assistant));
        assert!("system".parse::<Role>().is_err());
    }

    #[test]
    fn turns_deserialize_from_lowercase_roles() {
        let json = r#"[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]"#;
        let turns: Vec<ConversationTurn> = serde_json::from_str(json).unwrap();
        assert_eq!(
            turns,
            vec![ConversationTurn::user("hi"), ConversationTurn::assistant("hello")]
        );
    }
}
