//! # Grounded RAG Core
//!
//! Portable retrieval logic for Grounded RAG: data models, the fixed-window
//! chunker, the chunk store abstraction, brute-force cosine ranking, and
//! prompt assembly for the chat-completion call.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or network code.
//! Embedding and completion backends are reached through the
//! [`embedding::EmbeddingProvider`] and [`completion::ChatProvider`] traits,
//! which the `grounded-rag` application crate implements.
//!
//! ## Query path
//!
//! ```text
//! query ─▶ EmbeddingProvider ─▶ rank(ChunkStore::all) ─▶ assemble ─▶ ChatProvider
//! ```

pub mod chunk;
pub mod completion;
pub mod context;
pub mod embedding;
pub mod error;
pub mod models;
pub mod rank;
pub mod store;

pub use error::{RagError, Result};
pub use models::{Chunk, ConversationTurn, RankedResult, Role};
