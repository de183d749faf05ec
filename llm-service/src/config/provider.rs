/// Represents the provider (backend) used for LLM inference.
///
/// Distinguishes between a local Ollama runtime and the OpenAI API.
/// New providers can be added by extending this enum and the matching
/// client under `services/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime for on-device inference.
    Ollama,
    /// OpenAI REST API (chat completions + embeddings).
    OpenAI,
}

impl LlmProvider {
    /// Parses a provider name as used in the `LLM_KIND` env variable.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai" | "chatgpt" => Some(Self::OpenAI),
            _ => None,
        }
    }
}
