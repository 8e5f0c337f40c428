//! Configuration parsing and validation.
//!
//! Grounded RAG is configured via a TOML file (default
//! `./config/grag.toml`). Every section has defaults, so a minimal file can
//! be empty. The provider credential is never read from the file: it comes
//! from the `OPENAI_API_KEY` environment variable when a provider is built.
//!
//! # Example
//!
//! ```toml
//! [db]
//! path = "./data/grag.sqlite"
//!
//! [chunking]
//! chunk_size = 1000
//! overlap = 150
//!
//! [retrieval]
//! top_k = 4
//!
//! [embedding]
//! provider = "openai"
//! model = "text-embedding-3-small"
//!
//! [chat]
//! provider = "openai"
//! model = "gpt-4.1-mini"
//!
//! [ingest]
//! data_dir = "./data"
//! extensions = ["txt", "md", "csv", "json", "pdf"]
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use grounded_rag_core::chunk::{ChunkParams, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
use grounded_rag_core::rank::DEFAULT_TOP_K;

/// Environment variable holding the provider credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/grag.sqlite")
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_overlap() -> usize {
    DEFAULT_OVERLAP
}

impl ChunkingConfig {
    /// Validated chunker parameters.
    pub fn params(&self) -> Result<ChunkParams> {
        Ok(ChunkParams::new(self.chunk_size, self.overlap)?)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Expected vector length. Unset by default; when set it is requested
    /// from the provider and every response is checked against it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dims: Option<usize>,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_embedding_model(),
            dims: None,
            timeout_secs: default_embedding_timeout(),
            base_url: default_base_url(),
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_chat_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_chat_model(),
            temperature: default_temperature(),
            timeout_secs: default_chat_timeout(),
            base_url: default_base_url(),
        }
    }
}

impl ChatConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_chat_model() -> String {
    "gpt-4.1-mini".to_string()
}
fn default_temperature() -> f64 {
    0.2
}
fn default_embedding_timeout() -> u64 {
    30
}
fn default_chat_timeout() -> u64 {
    60
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            extensions: default_extensions(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_extensions() -> Vec<String> {
    ["txt", "md", "csv", "json", "pdf"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Lowercase an extension and strip any leading dot (`".PDF"` → `"pdf"`).
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Read, parse, and validate a configuration file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config =
        toml::from_str(content).with_context(|| "Failed to parse config file")?;

    config.ingest.extensions = config
        .ingest
        .extensions
        .iter()
        .map(|e| normalize_extension(e))
        .filter(|e| !e.is_empty())
        .collect();

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    config
        .chunking
        .params()
        .context("chunking.chunk_size must be > 0 and chunking.overlap < chunk_size")?;

    for (section, provider) in [
        ("embedding", config.embedding.provider.as_str()),
        ("chat", config.chat.provider.as_str()),
    ] {
        match provider {
            "openai" | "disabled" => {}
            other => bail!(
                "Unknown {} provider: '{}'. Must be openai or disabled.",
                section,
                other
            ),
        }
    }

    if config.embedding.is_enabled() && config.embedding.model.trim().is_empty() {
        bail!("embedding.model must be set when provider is '{}'", config.embedding.provider);
    }
    if config.embedding.dims == Some(0) {
        bail!("embedding.dims must be > 0");
    }
    if config.chat.is_enabled() && config.chat.model.trim().is_empty() {
        bail!("chat.model must be set when provider is '{}'", config.chat.provider);
    }
    if !(0.0..=2.0).contains(&config.chat.temperature) {
        bail!("chat.temperature must be in [0.0, 2.0]");
    }

    if config.ingest.extensions.is_empty() {
        bail!("ingest.extensions must list at least one file extension");
    }

    Ok(())
}

/// Render the default configuration as TOML, for `grag init`.
pub fn default_config_toml() -> Result<String> {
    Ok(toml::to_string_pretty(&Config::default())?)
}
