//! Universal health service for LLM backends (Ollama, OpenAI).
//!
//! Lightweight availability probes:
//! - Ollama: `GET {endpoint}/api/tags` (best-effort model existence check)
//! - OpenAI: `GET {endpoint}/v1/models` with Bearer auth
//!
//! The returned [`HealthStatus`] is JSON-serializable and suitable for a
//! `/health` endpoint. [`HealthService::check`] is resilient and never fails:
//! errors are mapped to `ok = false`. The generation pipeline uses
//! [`HealthService::is_available`] as its pre-generation probe.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{LlmModelConfig, LlmProvider};
use crate::errors::{LlmError, make_snippet};

/// A serializable health snapshot for a single provider/config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Backend/provider (e.g. "Ollama", "OpenAI").
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model identifier relevant to the probe.
    pub model: Option<String>,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds for the main probe.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    fn ok(
        provider: LlmProvider,
        endpoint: &str,
        model: Option<&str>,
        latency_ms: u128,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: format!("{provider:?}"),
            endpoint: endpoint.to_string(),
            model: model.map(str::to_string),
            ok: true,
            latency_ms,
            message: message.into(),
        }
    }

    fn fail(
        provider: LlmProvider,
        endpoint: &str,
        model: Option<&str>,
        latency_ms: u128,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: format!("{provider:?}"),
            endpoint: endpoint.to_string(),
            model: model.map(str::to_string),
            ok: false,
            latency_ms,
            message: message.into(),
        }
    }
}

/// A universal health checker that reuses a single HTTP client.
///
/// The client is constructed with a short default timeout so liveness checks
/// never hang the request path; individual probes may override it per config.
pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds).
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, LlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(5));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Checks health for a single LLM config, routing to the provider probe.
    ///
    /// Resilient: never returns an error. Any failure is converted into
    /// `HealthStatus { ok: false, .. }`.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            warn!(
                provider = ?cfg.provider,
                endpoint = %cfg.endpoint,
                "invalid endpoint (empty or missing http/https)"
            );
            return HealthStatus::fail(
                cfg.provider,
                endpoint,
                Some(&cfg.model),
                0,
                "endpoint is empty or missing http/https",
            );
        }

        let start = Instant::now();
        let result = match cfg.provider {
            LlmProvider::Ollama => self.try_probe_ollama(cfg).await,
            LlmProvider::OpenAI => self.try_probe_openai(cfg).await,
        };

        match result {
            Ok(mut status) => {
                if status.latency_ms == 0 {
                    status.latency_ms = start.elapsed().as_millis();
                }
                debug!(
                    provider = %status.provider,
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status = HealthStatus::fail(
                    cfg.provider,
                    &cfg.endpoint,
                    Some(&cfg.model),
                    start.elapsed().as_millis(),
                    err.to_string(),
                );
                warn!(
                    provider = %status.provider,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Convenience boolean probe used as the pre-generation availability gate.
    pub async fn is_available(&self, cfg: &LlmModelConfig) -> bool {
        self.check(cfg).await.ok
    }

    /// Checks health for multiple configs.
    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    /// Strict Ollama probe: `GET {endpoint}/api/tags`, best-effort model check.
    async fn try_probe_ollama(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, LlmError> {
        let url = format!("{}/api/tags", cfg.endpoint.trim_end_matches('/'));
        let start = Instant::now();

        let resp = self
            .client
            .get(&url)
            .timeout(self.default_timeout)
            .send()
            .await?;

        let latency = start.elapsed().as_millis();

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(LlmError::HttpStatus {
                status,
                url,
                snippet: make_snippet(&text),
            });
        }

        // Expected minimal JSON: { "models": [ { "name": "<model>" }, ... ] }
        #[derive(serde::Deserialize)]
        struct Tag {
            name: String,
        }
        #[derive(serde::Deserialize)]
        struct Tags {
            models: Option<Vec<Tag>>,
        }

        match resp.json::<Tags>().await {
            Ok(tags) => {
                if let Some(models) = tags.models {
                    if models.iter().any(|m| m.name == cfg.model) {
                        Ok(HealthStatus::ok(
                            cfg.provider,
                            &cfg.endpoint,
                            Some(&cfg.model),
                            latency,
                            "Ollama is healthy; model is available",
                        ))
                    } else {
                        Ok(HealthStatus::fail(
                            cfg.provider,
                            &cfg.endpoint,
                            Some(&cfg.model),
                            latency,
                            "Ollama is up, but model not found in /api/tags",
                        ))
                    }
                } else {
                    Ok(HealthStatus::ok(
                        cfg.provider,
                        &cfg.endpoint,
                        Some(&cfg.model),
                        latency,
                        "Ollama is healthy; tags response without `models` field",
                    ))
                }
            }
            Err(e) => Ok(HealthStatus::ok(
                cfg.provider,
                &cfg.endpoint,
                Some(&cfg.model),
                latency,
                format!("Ollama is reachable; failed to decode /api/tags: {e}"),
            )),
        }
    }

    /// Strict OpenAI probe: `GET {endpoint}/v1/models` with Bearer auth.
    async fn try_probe_openai(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, LlmError> {
        let url = format!("{}/v1/models", cfg.endpoint.trim_end_matches('/'));

        let api_key = cfg.api_key.as_ref().ok_or(LlmError::MissingApiKey)?;
        let auth_header = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| LlmError::Decode(format!("invalid API key header: {e}")))?;

        let start = Instant::now();
        let resp = self
            .client
            .get(&url)
            .timeout(self.default_timeout)
            .header(header::AUTHORIZATION, auth_header)
            .send()
            .await?;

        let latency = start.elapsed().as_millis();

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(LlmError::HttpStatus {
                status,
                url,
                snippet: make_snippet(&text),
            });
        }

        // Expected minimal JSON: { "data": [ { "id": "<model>" }, ... ] }
        #[derive(serde::Deserialize)]
        struct ModelItem {
            id: String,
        }
        #[derive(serde::Deserialize)]
        struct Models {
            data: Vec<ModelItem>,
        }

        match resp.json::<Models>().await {
            Ok(models) => {
                if models.data.iter().any(|m| m.id == cfg.model) {
                    Ok(HealthStatus::ok(
                        cfg.provider,
                        &cfg.endpoint,
                        Some(&cfg.model),
                        latency,
                        "OpenAI is healthy; model is available",
                    ))
                } else {
                    Ok(HealthStatus::fail(
                        cfg.provider,
                        &cfg.endpoint,
                        Some(&cfg.model),
                        latency,
                        "OpenAI is up, but model not found in /v1/models",
                    ))
                }
            }
            Err(e) => Ok(HealthStatus::ok(
                cfg.provider,
                &cfg.endpoint,
                Some(&cfg.model),
                latency,
                format!("OpenAI is reachable; failed to decode /v1/models: {e}"),
            )),
        }
    }
}
