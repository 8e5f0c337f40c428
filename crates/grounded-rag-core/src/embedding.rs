//! Embedding provider trait and vector utilities.
//!
//! Defines the [`EmbeddingProvider`] trait that embedding backends
//! implement, the [`embed_text`] entry point that guards against blank
//! input, and pure helpers for vector serialization and similarity.
//!
//! Concrete providers (OpenAI, disabled) live in the `grounded-rag` app
//! crate. Providers never retry or cache; both are caller concerns.

use async_trait::async_trait;

use crate::error::{RagError, Result};

/// An external embedding backend.
///
/// # Errors
///
/// Implementations return [`RagError::ProviderUnavailable`] when the backend
/// cannot be reached or is not configured, and [`RagError::Provider`] when
/// it rejects the request.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;

    /// Returns the expected vector dimensionality, if known up front.
    fn dims(&self) -> Option<usize>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, returning vectors in input order.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Embed `text`, rejecting blank input before any provider call is made.
pub async fn embed_text(provider: &dyn EmbeddingProvider, text: &str) -> Result<Vec<f32>> {
    if text.trim().is_empty() {
        return Err(RagError::EmptyInput);
    }
    tracing::debug!(model = provider.model_name(), chars = text.len(), "embedding text");
    provider.embed(text).await
}

/// Encode a float vector as a BLOB (little-endian f32 bytes).
///
/// # Example
///
/// ```rust
/// use grounded_rag_core::embedding::{vec_to_blob, blob_to_vec};
///
/// let v = vec![1.0f32, -2.5, 3.125];
/// let blob = vec_to_blob(&v);
/// assert_eq!(blob.len(), 12); // 3 × 4 bytes
/// assert_eq!(blob_to_vec(&blob), v);
/// ```
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB back into a float vector.
///
/// Trailing bytes that do not form a whole `f32` are ignored; callers that
/// know the expected dimension should compare lengths.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Euclidean (L2) norm.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value clamped to `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal, or either vector has zero norm
/// - `-1.0` = opposite direction
///
/// Vectors of different lengths also score `0.0`; the ranker checks
/// dimensions before calling this.
///
/// # Formula
///
/// ```text
///            a · b
/// cos(θ) = ─────────
///          ‖a‖ × ‖b‖
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }

    (dot / denom).clamp(-1.0, 1.0)
}
