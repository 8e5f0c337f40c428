//! # Grounded RAG
//!
//! Retrieval-augmented answering over a local directory of documents.
//!
//! Grounded RAG splits files into overlapping character windows, embeds
//! each window through an OpenAI-compatible API, stores the vectors in
//! SQLite, and answers questions by ranking every stored chunk against the
//! query with exact cosine similarity and sending the best ones to a chat
//! model as context.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────┐
//! │  data dir   │──▶│   Pipeline    │──▶│  SQLite   │
//! │ txt/md/pdf  │   │ Chunk+Embed  │   │  chunks   │
//! └─────────────┘   └──────────────┘   └────┬─────┘
//!                                           │
//!                    query ──▶ embed ──▶ rank ──▶ assemble ──▶ chat
//! ```
//!
//! The algorithms (chunking, ranking, prompt assembly, store contract) live
//! in the `grounded-rag-core` crate; this crate adds configuration, the
//! SQLite store, HTTP providers, file extraction and the `grag` CLI.
//!
//! ## Quick Start
//!
//! ```bash
//! grag init                         # write config and create database
//! grag ingest                       # index ./data
//! grag search "vacation policy"     # show ranked chunks
//! grag ask "How many vacation days do I get?"
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite chunk store |
//! | [`embedding`] | Embedding providers |
//! | [`completion`] | Chat-completion providers |
//! | [`extract`] | PDF and text extraction |
//! | [`ingest`] | Directory ingestion pipeline |
//! | [`progress`] | Ingest progress reporting |
//! | [`rag`] | Query-time retrieval service |
//! | [`search`] | `grag search` |
//! | [`ask`] | `grag ask` |
//! | [`stats`] | `grag stats` |

pub mod ask;
pub mod completion;
pub mod config;
pub mod db;
pub mod embedding;
pub mod extract;
pub mod ingest;
pub mod migrate;
mod openai;
pub mod progress;
pub mod rag;
pub mod search;
pub mod sqlite_store;
pub mod stats;
