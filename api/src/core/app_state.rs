use std::sync::Arc;

use llm_service::LlmProfiles;
use recipe_store::{PgRecipeStore, StoreConfig};
use resolver::Resolver;

use crate::core::adapters::{ProfileEmbedder, ProfileGenerator, StoreSource};
use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The query resolution pipeline.
    pub resolver: Arc<Resolver>,
    /// Provider profiles, exposed directly for health and model checks.
    pub profiles: Arc<LlmProfiles>,
}

impl AppState {
    /// Connects the store and builds the provider profiles from environment
    /// variables, then wires the resolver.
    pub async fn init() -> Result<Self, AppError> {
        let store = PgRecipeStore::connect(StoreConfig::from_env()?).await?;
        let profiles = Arc::new(LlmProfiles::from_env()?);

        let resolver = Arc::new(Resolver::new(
            Arc::new(StoreSource::new(store)),
            Arc::new(ProfileEmbedder::new(profiles.clone())),
            Arc::new(ProfileGenerator::new(profiles.clone())),
        ));

        Ok(Self { resolver, profiles })
    }
}
