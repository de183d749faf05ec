use crate::config::provider::LlmProvider;

/// Configuration for an LLM model invocation.
///
/// One instance describes one model behind one endpoint; the profile
/// facade holds separate configs for generation and embeddings.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The LLM provider/backend (Ollama or OpenAI).
    pub provider: LlmProvider,

    /// Model identifier string (e.g. `"llama3.1:8b"`, `"gpt-4o-mini"`).
    pub model: String,

    /// Inference endpoint (local URL or remote API base URL).
    pub endpoint: String,

    /// Optional API key for authentication (OpenAI).
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Request timeout in seconds. Provider clients always run with an
    /// explicit timeout; `None` falls back to the client default.
    pub timeout_secs: Option<u64>,
}
