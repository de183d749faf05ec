//! Provider-agnostic model configuration.

pub mod default_config;
pub mod model_config;
pub mod provider;

pub use model_config::LlmModelConfig;
pub use provider::LlmProvider;
