//! Shared LLM service with two active profiles: `generation` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (endpoint+model+key+timeout).
//! - Rate-limited calls are retried with bounded exponential backoff before
//!   the error is returned to the caller.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::{
    config::{LlmModelConfig, LlmProvider, default_config},
    errors::LlmError,
    health::{HealthService, HealthStatus},
    retry::{DEFAULT_ATTEMPTS, DEFAULT_BASE_DELAY, retry_rate_limited},
    services::{ollama::OllamaClient, openai::OpenAiClient},
};

/// Shared service that manages the **generation** and **embedding** profiles.
///
/// Internally caches Ollama/OpenAI clients keyed by their configuration to
/// avoid recreating HTTP clients on each call.
pub struct LlmProfiles {
    generation: LlmModelConfig,
    embedding: LlmModelConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaClient>>>,
    openai: RwLock<HashMap<ClientKey, Arc<OpenAiClient>>>,

    health: HealthService,
}

impl LlmProfiles {
    /// Creates a new service with the two profiles.
    pub fn new(
        generation: LlmModelConfig,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            generation,
            embedding,
            ollama: RwLock::new(HashMap::new()),
            openai: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Builds both profiles from environment variables.
    pub fn from_env() -> Result<Self, LlmError> {
        let generation = default_config::generation_config_from_env()?;
        let embedding = default_config::embedding_config_from_env()?;
        Self::new(generation, embedding, None)
    }

    /// Generates text using the **generation** profile.
    ///
    /// Rate-limit failures are retried up to 3 times with a doubling delay.
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, LlmError> {
        retry_rate_limited(DEFAULT_ATTEMPTS, DEFAULT_BASE_DELAY, || {
            self.generate_once(prompt, system)
        })
        .await
    }

    /// Computes an embedding using the **embedding** profile, with the same
    /// rate-limit retry policy as generation.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, LlmError> {
        retry_rate_limited(DEFAULT_ATTEMPTS, DEFAULT_BASE_DELAY, || {
            self.embed_once(input)
        })
        .await
    }

    /// Short liveness probe for the generation model. Never errors.
    pub async fn generation_available(&self) -> bool {
        self.health.is_available(&self.generation).await
    }

    /// Returns a health snapshot for all distinct profiles.
    ///
    /// If the embedding profile equals the generation profile, it is checked
    /// only once.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = Vec::<LlmModelConfig>::with_capacity(2);
        list.push(self.generation.clone());
        if self.embedding != self.generation {
            list.push(self.embedding.clone());
        }
        self.health.check_many(&list).await
    }

    /* --------------------- Internals --------------------- */

    async fn generate_once(&self, prompt: &str, system: Option<&str>) -> Result<String, LlmError> {
        match self.generation.provider {
            LlmProvider::Ollama => {
                let cli = self.get_or_init_ollama(&self.generation).await?;
                cli.generate(prompt, system).await
            }
            LlmProvider::OpenAI => {
                let cli = self.get_or_init_openai(&self.generation).await?;
                cli.generate(prompt, system).await
            }
        }
    }

    async fn embed_once(&self, input: &str) -> Result<Vec<f32>, LlmError> {
        match self.embedding.provider {
            LlmProvider::Ollama => {
                let cli = self.get_or_init_ollama(&self.embedding).await?;
                cli.embeddings(input).await
            }
            LlmProvider::OpenAI => {
                let cli = self.get_or_init_openai(&self.embedding).await?;
                cli.embeddings(input).await
            }
        }
    }

    async fn get_or_init_ollama(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OllamaClient>, LlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OllamaClient::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }

    async fn get_or_init_openai(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OpenAiClient>, LlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.openai.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.openai.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OpenAiClient::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Internal cache key to identify unique client configs.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}
