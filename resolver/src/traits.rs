//! Collaborator seams for the resolver.
//!
//! The pipeline never talks to Postgres, Ollama, or OpenAI directly; it sees
//! these traits and the API layer supplies adapters. Tests supply in-memory
//! fakes.

use std::{future::Future, pin::Pin};

use recipe_store::{Recipe, RecipeHit, StoreError};

use crate::prompt::GenerationRequest;

/// Boxed future alias used by the dyn-compatible collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Failure shape shared by the embedding and generation collaborators.
///
/// Adapters are expected to have already applied their own bounded retry for
/// rate limits; a `RateLimited` here means the quota problem persisted.
#[derive(Debug, Clone)]
pub enum ProviderFailure {
    /// Quota exhausted after the client's bounded retry.
    RateLimited(String),
    /// Backend unreachable, misconfigured, or missing its model artifacts.
    Unavailable(String),
    /// Anything else.
    Other(String),
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderFailure::RateLimited(m) => write!(f, "rate limited: {m}"),
            ProviderFailure::Unavailable(m) => write!(f, "unavailable: {m}"),
            ProviderFailure::Other(m) => write!(f, "{m}"),
        }
    }
}

/// Maps a query text to a fixed-dimension vector.
pub trait EmbeddingProvider: Send + Sync {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, ProviderFailure>>;
}

/// Produces the conversational reply from a structured request.
///
/// The adapter renders the literal prompt (see [`crate::prompt`]); the
/// resolver only hands over structure.
pub trait TextGenerator: Send + Sync {
    /// Short liveness probe, consulted before any generation attempt.
    fn is_available<'a>(&'a self) -> BoxFuture<'a, bool>;

    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<String, ProviderFailure>>;
}

/// Read-only view over the recipe corpus.
pub trait RecipeSource: Send + Sync {
    fn recipe_count<'a>(&'a self) -> BoxFuture<'a, Result<i64, StoreError>>;

    fn embedding_count<'a>(&'a self) -> BoxFuture<'a, Result<i64, StoreError>>;

    /// Top-`k` nearest recipes by the corpus distance metric, ascending.
    fn nearest<'a>(
        &'a self,
        query: &'a [f32],
        k: i64,
    ) -> BoxFuture<'a, Result<Vec<RecipeHit>, StoreError>>;

    /// Term-matched candidate set for in-process lexical scoring: recipes
    /// where any term occurs in title, ingredients, or instructions.
    /// Ascending id, bounded.
    fn candidates<'a>(
        &'a self,
        terms: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<Recipe>, StoreError>>;

    /// Unranked sample in defined order (ascending id).
    fn sample<'a>(&'a self, k: i64) -> BoxFuture<'a, Result<Vec<Recipe>, StoreError>>;
}
