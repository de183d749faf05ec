//! Adapters wiring the resolver's collaborator traits to the real store and
//! provider profiles. The generator adapter owns prompt rendering, so prompt
//! format changes never touch the pipeline.

use std::sync::Arc;

use llm_service::{LlmError, LlmProfiles};
use recipe_store::{PgRecipeStore, Recipe, RecipeHit, StoreError};
use resolver::traits::BoxFuture;
use resolver::{EmbeddingProvider, GenerationRequest, ProviderFailure, RecipeSource, TextGenerator, prompt};

fn provider_failure(err: LlmError) -> ProviderFailure {
    if err.is_rate_limited() {
        return ProviderFailure::RateLimited(err.to_string());
    }
    match err {
        LlmError::Transport(_) => ProviderFailure::Unavailable(err.to_string()),
        other => ProviderFailure::Other(other.to_string()),
    }
}

/// Resolver view over the Postgres store.
pub struct StoreSource {
    store: PgRecipeStore,
}

impl StoreSource {
    pub fn new(store: PgRecipeStore) -> Self {
        Self { store }
    }
}

impl RecipeSource for StoreSource {
    fn recipe_count<'a>(&'a self) -> BoxFuture<'a, Result<i64, StoreError>> {
        Box::pin(async move { self.store.recipe_count().await })
    }

    fn embedding_count<'a>(&'a self) -> BoxFuture<'a, Result<i64, StoreError>> {
        Box::pin(async move { self.store.embedding_count().await })
    }

    fn nearest<'a>(
        &'a self,
        query: &'a [f32],
        k: i64,
    ) -> BoxFuture<'a, Result<Vec<RecipeHit>, StoreError>> {
        Box::pin(async move { self.store.nearest(query, k).await })
    }

    fn candidates<'a>(
        &'a self,
        terms: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<Recipe>, StoreError>> {
        Box::pin(async move { self.store.candidates(terms).await })
    }

    fn sample<'a>(&'a self, k: i64) -> BoxFuture<'a, Result<Vec<Recipe>, StoreError>> {
        Box::pin(async move { self.store.sample(k).await })
    }
}

/// Embedding provider backed by the embedding profile.
pub struct ProfileEmbedder {
    profiles: Arc<LlmProfiles>,
}

impl ProfileEmbedder {
    pub fn new(profiles: Arc<LlmProfiles>) -> Self {
        Self { profiles }
    }
}

impl EmbeddingProvider for ProfileEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, ProviderFailure>> {
        Box::pin(async move { self.profiles.embed(text).await.map_err(provider_failure) })
    }
}

/// Text generator backed by the generation profile. Renders the structured
/// request into the provider prompt.
pub struct ProfileGenerator {
    profiles: Arc<LlmProfiles>,
}

impl ProfileGenerator {
    pub fn new(profiles: Arc<LlmProfiles>) -> Self {
        Self { profiles }
    }
}

impl TextGenerator for ProfileGenerator {
    fn is_available<'a>(&'a self) -> BoxFuture<'a, bool> {
        Box::pin(async move { self.profiles.generation_available().await })
    }

    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<String, ProviderFailure>> {
        Box::pin(async move {
            let system = prompt::system_for(request.intent);
            let rendered = prompt::render(request);
            self.profiles
                .generate(&rendered, Some(system))
                .await
                .map_err(provider_failure)
        })
    }
}
