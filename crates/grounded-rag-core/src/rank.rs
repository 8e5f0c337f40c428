//! Brute-force cosine similarity ranking.
//!
//! # Algorithm
//!
//! 1. Check that every chunk vector has the query's dimension; any
//!    disagreement fails the whole query with
//!    [`RagError::DimensionMismatch`] (the index was built with another
//!    embedding model).
//! 2. Score each chunk with [`cosine_similarity`]; a zero-norm vector on
//!    either side scores `0.0`.
//! 3. Stable-sort by score descending. Equal scores keep the corpus
//!    enumeration order, so results are reproducible for a fixed snapshot.
//! 4. Keep the first `top_k`.
//!
//! Cost is `O(N·D)` time and `O(N)` extra space per query. There is no
//! index: every query scans every chunk.

use std::cmp::Ordering;

use crate::embedding::cosine_similarity;
use crate::error::{RagError, Result};
use crate::models::{Chunk, RankedResult};

/// Default number of results per query.
pub const DEFAULT_TOP_K: usize = 4;

/// Rank `corpus` against `query_vector` and return at most `top_k` results,
/// best first.
///
/// An empty corpus or `top_k == 0` yields an empty vector.
pub fn rank(query_vector: &[f32], corpus: &[Chunk], top_k: usize) -> Result<Vec<RankedResult>> {
    if corpus.is_empty() || top_k == 0 {
        return Ok(Vec::new());
    }

    if let Some(bad) = corpus.iter().find(|c| c.dims() != query_vector.len()) {
        return Err(RagError::DimensionMismatch {
            expected: query_vector.len(),
            found: bad.dims(),
            source_label: bad.source.clone(),
        });
    }

    let mut scored: Vec<(usize, f32)> = corpus
        .iter()
        .enumerate()
        .map(|(i, chunk)| (i, cosine_similarity(query_vector, &chunk.vector)))
        .collect();

    // `sort_by` is stable; NaN (only possible from NaN inputs) sorts last.
    scored.sort_by(|a, b| descending(a.1, b.1));
    scored.truncate(top_k);

    Ok(scored
        .into_iter()
        .map(|(i, score)| RankedResult {
            chunk: corpus[i].clone(),
            score,
        })
        .collect())
}

fn descending(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
