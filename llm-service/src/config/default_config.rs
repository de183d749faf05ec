//! Default LLM configs loaded strictly from environment variables.
//!
//! Convenience constructors for [`LlmModelConfig`], grouped by role:
//!
//! - **Generation** → the conversational model that writes the reply
//! - **Embedding**  → the model that maps a query to a vector
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND` = provider kind (`ollama` by default, or `openai`)
//! - `LLM_MAX_TOKENS` = optional max tokens (u32)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (one of them is mandatory)
//! - `OLLAMA_MODEL`    = generation model (mandatory)
//! - `EMBEDDING_MODEL` = embedding model (mandatory)
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY`     = API key (mandatory)
//! - `OPENAI_URL`         = API base (defaults to `https://api.openai.com`)
//! - `OPENAI_MODEL`       = generation model (defaults to `gpt-4o-mini`)
//! - `OPENAI_EMBED_MODEL` = embedding model (defaults to `text-embedding-3-small`)

use crate::{
    config::{model_config::LlmModelConfig, provider::LlmProvider},
    errors::{ConfigError, LlmError, env_opt_u32, must_env},
};

/// Resolves the configured provider kind from `LLM_KIND` (defaults to Ollama).
pub fn provider_from_env() -> Result<LlmProvider, LlmError> {
    match std::env::var("LLM_KIND") {
        Ok(kind) if !kind.trim().is_empty() => LlmProvider::parse(&kind)
            .ok_or_else(|| ConfigError::UnsupportedProvider(kind).into()),
        _ => Ok(LlmProvider::Ollama),
    }
}

/// Constructs the config for the **generation** model.
///
/// # Defaults
/// - `temperature = Some(0.7)`
/// - `top_p = Some(0.9)`
/// - `timeout_secs = Some(30)`
pub fn generation_config_from_env() -> Result<LlmModelConfig, LlmError> {
    let provider = provider_from_env()?;
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;

    let cfg = match provider {
        LlmProvider::Ollama => LlmModelConfig {
            provider,
            model: must_env("OLLAMA_MODEL")?,
            endpoint: ollama_endpoint()?,
            api_key: None,
            max_tokens,
            temperature: Some(0.7),
            top_p: Some(0.9),
            timeout_secs: Some(30),
        },
        LlmProvider::OpenAI => LlmModelConfig {
            provider,
            model: env_or("OPENAI_MODEL", "gpt-4o-mini"),
            endpoint: env_or("OPENAI_URL", "https://api.openai.com"),
            api_key: Some(must_env("OPENAI_API_KEY")?),
            max_tokens,
            temperature: Some(0.7),
            top_p: None,
            timeout_secs: Some(30),
        },
    };
    Ok(cfg)
}

/// Constructs the config for the **embedding** model.
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
/// - `timeout_secs = Some(10)`
pub fn embedding_config_from_env() -> Result<LlmModelConfig, LlmError> {
    let provider = provider_from_env()?;

    let cfg = match provider {
        LlmProvider::Ollama => LlmModelConfig {
            provider,
            model: must_env("EMBEDDING_MODEL")?,
            endpoint: ollama_endpoint()?,
            api_key: None,
            max_tokens: None,
            temperature: Some(0.0),
            top_p: None,
            timeout_secs: Some(10),
        },
        LlmProvider::OpenAI => LlmModelConfig {
            provider,
            model: env_or("OPENAI_EMBED_MODEL", "text-embedding-3-small"),
            endpoint: env_or("OPENAI_URL", "https://api.openai.com"),
            api_key: Some(must_env("OPENAI_API_KEY")?),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(10),
        },
    };
    Ok(cfg)
}

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. `http://localhost:11434` otherwise
fn ollama_endpoint() -> Result<String, LlmError> {
    if let Ok(url) = std::env::var("OLLAMA_URL") {
        if !url.trim().is_empty() {
            return Ok(url);
        }
    }
    if let Ok(port) = std::env::var("OLLAMA_PORT") {
        if !port.trim().is_empty() {
            let _ = port
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "OLLAMA_PORT",
                    reason: "expected u16 (1..=65535)",
                })?;
            return Ok(format!("http://localhost:{port}"));
        }
    }
    Ok("http://localhost:11434".to_string())
}

fn env_or(name: &str, dflt: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| dflt.to_string())
}
