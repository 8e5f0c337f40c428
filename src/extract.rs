//! Plain-text extraction for ingested files.
//!
//! PDFs go through `pdf-extract`; every other supported extension is read
//! as UTF-8 with invalid sequences dropped. Extraction never panics: a
//! failure is returned as [`ExtractError`] and the ingest pipeline skips
//! the file. `pdf-extract` can panic on documents that parse but are
//! malformed (e.g. a font referenced without a `/Resources` entry), so the
//! call is wrapped in `catch_unwind`.

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// Extract text from the file at `path`, choosing the decoder by extension.
pub fn extract_file(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path)?;
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    if is_pdf {
        extract_pdf(&bytes)
    } else {
        Ok(decode_text_lossy(&bytes))
    }
}

pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(result) => result.map_err(|e| ExtractError::Pdf(e.to_string())),
        Err(_) => Err(ExtractError::Pdf("extractor panicked".to_string())),
    }
}

/// Decode bytes as UTF-8, dropping anything that is not valid UTF-8.
pub fn decode_text_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect()
}
