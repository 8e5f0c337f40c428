//! Prompt assembly for the grounded completion call.
//!
//! Produces the message list `[system, ...history, user]` where the final
//! user message carries the retrieved context block followed by the query.
//! Retrieval finding nothing is not an error: the context block becomes
//! [`NO_CONTEXT_PLACEHOLDER`] and the completion still runs.

use crate::completion::{ChatMessage, Prompt};
use crate::models::{ConversationTurn, RankedResult};

/// Fixed system instruction sent first in every prompt.
pub const SYSTEM_PROMPT: &str = "You are a helpful enterprise assistant. Use provided context when relevant. \
If the answer is not in context, say so clearly and provide best-effort guidance.";

/// Context block used when retrieval returns no chunks.
pub const NO_CONTEXT_PLACEHOLDER: &str = "No relevant context found.";

/// Join ranked chunks into one context block, best first.
///
/// Each entry is `Source: <source>\n<text>`; entries are separated by a
/// blank line.
pub fn build_context(ranked: &[RankedResult]) -> String {
    if ranked.is_empty() {
        return NO_CONTEXT_PLACEHOLDER.to_string();
    }

    ranked
        .iter()
        .map(|r| format!("Source: {}\n{}", r.chunk.source, r.chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the final user message from a context block and the query.
pub fn build_user_message(context: &str, query: &str) -> String {
    format!("Context:\n{}\n\nQuestion:\n{}", context, query)
}

/// Assemble the full prompt.
///
/// `history` must already exclude the message being answered; it is copied
/// in order and never modified.
pub fn assemble(query: &str, ranked: &[RankedResult], history: &[ConversationTurn]) -> Prompt {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(SYSTEM_PROMPT));
    messages.extend(history.iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(build_user_message(
        &build_context(ranked),
        query,
    )));
    Prompt { messages }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::MessageRole;
    use crate::models::Chunk;

    fn ranked(source: &str, text: &str, score: f32) -> RankedResult {
        RankedResult {
            chunk: Chunk::new(source, text, vec![1.0]),
            score,
        }
    }

    #[test]
    fn test_context_keeps_ranked_order() {
        let results = vec![
            ranked("data/b.txt", "best match", 0.9),
            ranked("data/a.txt", "runner up", 0.4),
        ];
        let ctx = build_context(&results);
        assert_eq!(
            ctx,
            "Source: data/b.txt\nbest match\n\nSource: data/a.txt\nrunner up"
        );
    }

    #[test]
    fn test_empty_context_uses_placeholder() {
        let prompt = assemble("What is the leave policy?", &[], &[]);
        assert_eq!(prompt.messages.len(), 2);
        let user = &prompt.messages[1];
        assert_eq!(user.role, MessageRole::User);
        assert!(user.content.contains(NO_CONTEXT_PLACEHOLDER));
        assert!(user.content.ends_with("Question:\nWhat is the leave policy?"));
    }

    #[test]
    fn test_message_layout_with_history() {
        let history = vec![
            ConversationTurn::user("hello"),
            ConversationTurn::assistant("hi, how can I help?"),
        ];
        let results = vec![ranked("data/a.txt", "Leave is 25 days.", 0.8)];
        let prompt = assemble("How many leave days?", &results, &history);

        let roles: Vec<MessageRole> = prompt.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User
            ]
        );
        assert_eq!(prompt.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(prompt.messages[1].content, "hello");
        assert_eq!(prompt.messages[2].content, "hi, how can I help?");
        assert_eq!(
            prompt.messages[3].content,
            "Context:\nSource: data/a.txt\nLeave is 25 days.\n\nQuestion:\nHow many leave days?"
        );
    }

    #[test]
    fn test_history_not_modified() {
        let history = vec![ConversationTurn::user("earlier question")];
        let before = history.clone();
        let _ = assemble("next", &[], &history);
        assert_eq!(history, before);
    }

    #[test]
    fn test_prompt_serializes_lowercase_roles() {
        let prompt = assemble("q", &[], &[]);
        let json = serde_json::to_value(&prompt.messages).unwrap();
        assert_eq!(json[0]["role"], "system");
        assert_eq!(json[1]["role"], "user");
    }
}
