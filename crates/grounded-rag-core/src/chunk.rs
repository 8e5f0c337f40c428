//! Fixed-window text chunker.
//!
//! Splits document text into overlapping windows measured in Unicode code
//! points, suitable for embedding.
//!
//! # Algorithm
//!
//! 1. Trim leading and trailing whitespace from the input.
//! 2. Emit the window `[start, min(start + chunk_size, len))`.
//! 3. Stop once a window ends at the text's end; otherwise advance
//!    `start` to `end - overlap`.
//! 4. Drop windows that are blank after trimming.
//!
//! Because `overlap < chunk_size` is enforced by [`ChunkParams::new`], every
//! step advances `start` by exactly `chunk_size - overlap`, so the loop
//! always terminates.
//!
//! # Example
//!
//! ```rust
//! use grounded_rag_core::chunk::{split_text, ChunkParams};
//!
//! let params = ChunkParams::new(4, 1).unwrap();
//! let chunks = split_text("abcdefghij", &params);
//! assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
//! ```

use crate::error::{RagError, Result};

/// Default window length in code points.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default number of code points shared by consecutive windows.
pub const DEFAULT_OVERLAP: usize = 150;

/// Validated chunking parameters.
///
/// Construct with [`ChunkParams::new`]; invalid combinations are rejected
/// up front so [`split_text`] itself cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParams {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkParams {
    /// # Errors
    ///
    /// [`RagError::InvalidChunking`] if `chunk_size == 0` or
    /// `overlap >= chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(RagError::InvalidChunking {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between the starts of consecutive windows.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

/// Split `text` into overlapping windows.
///
/// Windows keep their inner whitespace untouched; only blank windows are
/// removed. Blank input yields an empty vector.
pub fn split_text(text: &str, params: &ChunkParams) -> Vec<String> {
    let chars: Vec<char> = text.trim().chars().collect();
    let len = chars.len();

    let mut windows = Vec::new();
    let mut start = 0;
    while start < len {
        let end = (start + params.chunk_size).min(len);
        windows.push(chars[start..end].iter().collect::<String>());
        if end == len {
            break;
        }
        start = end - params.overlap;
    }

    windows.retain(|w| !w.trim().is_empty());
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(size: usize, overlap: usize) -> ChunkParams {
        ChunkParams::new(size, overlap).unwrap()
    }

    #[test]
    fn test_short_text_single_window() {
        assert_eq!(split_text("abc", &params(10, 2)), vec!["abc"]);
    }

    #[test]
    fn test_blank_text_yields_nothing() {
        assert!(split_text("", &params(10, 2)).is_empty());
        assert!(split_text("   \n\t  ", &params(10, 2)).is_empty());
    }

    #[test]
    fn test_input_is_trimmed() {
        assert_eq!(split_text("  hello  ", &params(10, 2)), vec!["hello"]);
    }

    #[test]
    fn test_last_window_ends_at_text_end() {
        let chunks = split_text("abcdefghijk", &params(4, 1));
        assert_eq!(chunks, vec!["abcd", "defg", "ghij", "jk"]);
    }

    #[test]
    fn test_every_character_covered() {
        let text: String = (0..2_345)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect();
        let p = params(100, 15);
        let chunks = split_text(&text, &p);

        let mut rebuilt: String = chunks[0].clone();
        for c in &chunks[1..] {
            rebuilt.extend(c.chars().skip(p.overlap()));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_windows_measured_in_code_points() {
        let text = "héllo wörld ñandú";
        let chunks = split_text(text, &params(5, 1));
        for c in &chunks[..chunks.len() - 1] {
            assert_eq!(c.chars().count(), 5);
        }
        assert!(chunks[0].starts_with("héllo"));
    }

    #[test]
    fn test_blank_windows_dropped() {
        // The middle window is pure whitespace.
        let text = format!("ab{}cd", " ".repeat(10));
        let chunks = split_text(&text, &params(4, 0));
        assert!(chunks.iter().all(|c| !c.trim().is_empty()));
        assert_eq!(chunks.first().map(String::as_str), Some("ab  "));
        assert_eq!(chunks.last().map(String::as_str), Some("cd"));
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_deterministic() {
        let text = "Alpha beta gamma delta epsilon zeta eta theta";
        let p = params(8, 3);
        assert_eq!(split_text(text, &p), split_text(text, &p));
    }

    #[test]
    fn test_rejects_non_advancing_params() {
        assert!(matches!(
            ChunkParams::new(0, 0),
            Err(RagError::InvalidChunking { .. })
        ));
        assert!(ChunkParams::new(10, 10).is_err());
        assert!(ChunkParams::new(10, 11).is_err());
        assert!(ChunkParams::new(10, 9).is_ok());
    }

    #[test]
    fn test_defaults() {
        let p = ChunkParams::default();
        assert_eq!(p.chunk_size(), 1000);
        assert_eq!(p.overlap(), 150);
        assert_eq!(p.stride(), 850);
    }
}
