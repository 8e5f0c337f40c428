//! Shared HTTP plumbing for the OpenAI-compatible embedding and chat
//! providers: client construction, credential lookup, and mapping of
//! transport and HTTP failures onto [`RagError`].

use serde::Deserialize;
use std::time::Duration;
use tracing::error;

use grounded_rag_core::{RagError, Result};

use crate::config::API_KEY_ENV;

pub(crate) const PROVIDER: &str = "openai";

/// Read the provider credential from the environment.
pub(crate) fn api_key_from_env() -> Result<String> {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(RagError::Configuration(format!(
            "{} environment variable not set",
            API_KEY_ENV
        ))),
    }
}

pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| RagError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Join a base URL and an endpoint path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// The request never produced a response (DNS, connect, timeout).
pub(crate) fn transport_error(e: reqwest::Error) -> RagError {
    error!(provider = PROVIDER, error = %e, "request failed");
    RagError::ProviderUnavailable {
        provider: PROVIDER.into(),
        message: format!("request failed: {e}"),
    }
}

/// Turn a non-success response into [`RagError::Provider`], preferring the
/// API's own error message over the raw body.
pub(crate) async fn status_error(response: reqwest::Response) -> RagError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_detail(&body);
    error!(provider = PROVIDER, %status, "API error");
    RagError::Provider {
        provider: PROVIDER.into(),
        status: status.as_u16(),
        message,
    }
}

pub(crate) fn error_detail(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

pub(crate) fn parse_error(status: u16, e: impl std::fmt::Display) -> RagError {
    error!(provider = PROVIDER, error = %e, "failed to parse response");
    RagError::Provider {
        provider: PROVIDER.into(),
        status,
        message: format!("failed to parse response: {e}"),
    }
}
