//! Unified error handling for `llm-service`.
//!
//! One top-level [`LlmError`] for the whole crate, with config errors in a
//! nested [`ConfigError`] enum. Rate-limit responses get their own variant so
//! callers can apply a bounded retry before giving up.

use reqwest::StatusCode;
use thiserror::Error;

/// Top-level error for the `llm-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LlmError {
    /// Configuration/validation errors (startup/readiness).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The provider in the config does not match the client being built.
    #[error("invalid provider: expected {expected}")]
    InvalidProvider { expected: &'static str },

    /// Invalid endpoint (empty or missing http/https).
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// API key required but missing.
    #[error("missing API key for provider")]
    MissingApiKey,

    /// Transport/HTTP client error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream said the caller is over quota. Retried with backoff
    /// before being surfaced.
    #[error("rate limited by {url}: {snippet}")]
    RateLimited { url: String, snippet: String },

    /// Non-successful HTTP status from upstream (other than 429).
    #[error("unexpected HTTP status {status} from {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    /// Unexpected/invalid JSON response.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl LlmError {
    /// True when the failure is a rate-limit signal: HTTP 429 or a message
    /// pattern the hosted providers use in their error bodies.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::HttpStatus { status, snippet, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS
                    || snippet.to_ascii_lowercase().contains("rate limit")
            }
            LlmError::Transport(err) => {
                err.status() == Some(StatusCode::TOO_MANY_REQUESTS)
            }
            _ => false,
        }
    }

    /// Classifies a non-success HTTP response into the right variant.
    pub(crate) fn from_status(status: StatusCode, url: String, body: &str) -> Self {
        let snippet = make_snippet(body);
        if status == StatusCode::TOO_MANY_REQUESTS
            || snippet.to_ascii_lowercase().contains("rate limit")
        {
            LlmError::RateLimited { url, snippet }
        } else {
            LlmError::HttpStatus {
                status,
                url,
                snippet,
            }
        }
    }
}

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (ports, limits, timeouts).
    #[error("invalid number in {var}: {reason}")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    /// Unsupported provider in `LLM_KIND`.
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),
}

/// Trims a response body down to a short log-friendly snippet.
pub fn make_snippet(text: &str) -> String {
    text.chars().take(240).collect()
}

/// Fetches a required, non-empty environment variable.
pub fn must_env(name: &'static str) -> Result<String, LlmError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Parses an optional `u32` from env (`Ok(None)` if unset/empty).
pub fn env_opt_u32(name: &'static str) -> Result<Option<u32>, LlmError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.parse::<u32>().map(Some).map_err(|_| {
            LlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u32",
            })
        }),
        _ => Ok(None),
    }
}
