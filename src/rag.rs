//! The query-time retrieval service.
//!
//! [`RagService`] owns the embedding provider, chat provider and chunk store
//! and exposes the query path as four calls:
//!
//! ```text
//! embed_text ──▶ find_relevant_chunks ──▶ generate_answer
//!        └──────────── answer (all three) ───────────┘
//! ```
//!
//! Construction is the only place providers are resolved, so a missing
//! credential fails once, up front, with [`RagError::Configuration`].

use tracing::{debug, info};

use grounded_rag_core::completion::ChatProvider;
use grounded_rag_core::context::assemble;
use grounded_rag_core::embedding::{self, EmbeddingProvider};
use grounded_rag_core::rank::rank;
use grounded_rag_core::store::ChunkStore;
use grounded_rag_core::{ConversationTurn, RagError, RankedResult, Result};

use crate::completion::create_chat_provider;
use crate::config::Config;
use crate::embedding::create_provider;

pub struct RagService {
    embedder: Box<dyn EmbeddingProvider>,
    chat: Box<dyn ChatProvider>,
    store: Box<dyn ChunkStore>,
    top_k: usize,
}

impl RagService {
    /// Assemble a service from already-built parts.
    pub fn new(
        embedder: Box<dyn EmbeddingProvider>,
        chat: Box<dyn ChatProvider>,
        store: Box<dyn ChunkStore>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            chat,
            store,
            top_k,
        }
    }

    /// Build the providers named in `config` around `store`.
    ///
    /// # Errors
    ///
    /// [`RagError::Configuration`] when either provider is disabled, unknown,
    /// or missing its credential.
    pub fn from_config(config: &Config, store: Box<dyn ChunkStore>) -> Result<Self> {
        if !config.embedding.is_enabled() {
            return Err(RagError::Configuration(
                "embedding provider is disabled; set [embedding] provider in config".into(),
            ));
        }
        if !config.chat.is_enabled() {
            return Err(RagError::Configuration(
                "chat provider is disabled; set [chat] provider in config".into(),
            ));
        }
        let embedder = create_provider(&config.embedding)?;
        let chat = create_chat_provider(&config.chat)?;
        Ok(Self::new(embedder, chat, store, config.retrieval.top_k))
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Embed `text`. Blank text fails with [`RagError::EmptyInput`] before
    /// the provider is called.
    pub async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        embedding::embed_text(self.embedder.as_ref(), text).await
    }

    /// Rank every stored chunk against `query_vector` and keep the best
    /// `top_k` (the configured value when `None`).
    pub async fn find_relevant_chunks(
        &self,
        query_vector: &[f32],
        top_k: Option<usize>,
    ) -> Result<Vec<RankedResult>> {
        let corpus = self.store.all().await?;
        let top_k = top_k.unwrap_or(self.top_k);
        let ranked = rank(query_vector, &corpus, top_k)?;
        debug!(corpus = corpus.len(), top_k, hits = ranked.len(), "ranked chunks");
        Ok(ranked)
    }

    /// Assemble the prompt from `context` and `history`, then complete it.
    pub async fn generate_answer(
        &self,
        query: &str,
        context: &[RankedResult],
        history: &[ConversationTurn],
    ) -> Result<String> {
        let prompt = assemble(query, context, history);
        self.chat.complete(&prompt).await
    }

    /// The full query path: embed, rank, assemble and complete.
    pub async fn answer(
        &self,
        query: &str,
        history: &[ConversationTurn],
        top_k: Option<usize>,
    ) -> Result<Answer> {
        let query_vector = self.embed_text(query).await?;
        let sources = self.find_relevant_chunks(&query_vector, top_k).await?;
        let text = self.generate_answer(query, &sources, history).await?;
        info!(model = self.chat.model_name(), sources = sources.len(), "answered query");
        Ok(Answer { text, sources })
    }
}

/// A generated answer together with the chunks it was grounded on.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<RankedResult>,
}
