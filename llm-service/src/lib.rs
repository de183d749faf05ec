//! Shared LLM plumbing for the recipe chat backend.
//!
//! Providers (Ollama/OpenAI) behind one config shape, unified errors,
//! a resilient availability probe, and a profile facade that owns one
//! generation model and one embedding model.

pub mod config;
pub mod errors;
pub mod health;
pub mod profiles;
pub mod retry;
pub mod services;

pub use config::{LlmModelConfig, LlmProvider};
pub use errors::{ConfigError, LlmError};
pub use health::{HealthService, HealthStatus};
pub use profiles::LlmProfiles;
