//! Query resolution pipeline for the recipe chat backend.
//!
//! Turns one chat turn into a final reply by running an ordered list of
//! resolution strategies, first success terminal:
//!
//! 1. readiness gate — empty corpus short-circuits with an instructional
//!    reply, before any retrieval or provider call;
//! 2. small-talk short-circuit — greeting turns with empty retrieval;
//! 3. generator-backed answer over a bounded recipe context;
//! 4. template fallback synthesized directly from the retrieved records;
//! 5. no-results reply.
//!
//! Retrieval itself is two-tier: semantic nearest-neighbor search when the
//! corpus has embeddings and the embedding provider cooperates, lexical
//! scoring otherwise. Collaborators are injected behind traits so the whole
//! pipeline runs against in-memory fakes in tests.

pub mod context;
pub mod error;
pub mod intent;
pub mod prompt;
pub mod template;
pub mod traits;

pub use error::ResolverError;
pub use intent::Intent;
pub use prompt::{ChatMessage, GenerationRequest};
pub use traits::{EmbeddingProvider, ProviderFailure, RecipeSource, TextGenerator};

use std::sync::Arc;

use recipe_store::{RecipeHit, StoreError, lexical};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Candidates fetched per retrieval.
pub const TOP_K: i64 = 5;

/// Reply when the corpus has no recipes at all.
pub const EMPTY_CORPUS_REPLY: &str = "I don't have any recipes loaded yet. Import the recipe \
dataset first, then ask me again.";

/// Reply when retrieval found nothing for a recipe-seeking message.
pub const NO_RESULTS_REPLY: &str = "I couldn't find any recipes matching that. Try naming a \
dish or an ingredient, for example: show me a quick pasta dinner, or chicken recipes.";

/// Canned greeting used when the generator cannot produce one.
pub const SMALL_TALK_REPLY: &str = "Hello! I'm your recipe assistant. Ask me about a dish, an \
ingredient, or what to cook for dinner.";

/// One incoming chat turn. Never persisted.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub message: String,
    pub history: Vec<ChatMessage>,
}

/// Which strategy produced the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    EmptyCorpus,
    SmallTalk,
    Generated,
    TemplateFallback,
    NoResults,
}

/// Recipe reference attached to a recipe-path reply.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub title: String,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub distance: f64,
}

/// Final result of resolving a turn.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub reply: String,
    pub sources: Option<Vec<SourceRef>>,
    pub llm_unavailable: bool,
    pub outcome: Outcome,
}

impl Resolution {
    fn plain(reply: &str, outcome: Outcome) -> Self {
        Self {
            reply: reply.to_string(),
            sources: None,
            llm_unavailable: false,
            outcome,
        }
    }
}

/// The pipeline itself. Holds only shared read-only collaborators; all other
/// state is request-scoped.
pub struct Resolver {
    store: Arc<dyn RecipeSource>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn TextGenerator>,
    top_k: i64,
}

impl Resolver {
    pub fn new(
        store: Arc<dyn RecipeSource>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            store,
            embedder,
            generator,
            top_k: TOP_K,
        }
    }

    /// Resolves one turn to a reply.
    ///
    /// # Errors
    /// [`ResolverError::Store`] when the store fails with no retrieval
    /// fallback left; [`ResolverError::RateLimited`] when a provider stayed
    /// rate-limited through its bounded retry.
    #[instrument(skip_all, fields(message_chars = turn.message.chars().count()))]
    pub async fn resolve(&self, turn: &ConversationTurn) -> Result<Resolution, ResolverError> {
        let recipes = self.store.recipe_count().await?;
        if recipes == 0 {
            info!("corpus is empty, skipping retrieval");
            return Ok(Resolution::plain(EMPTY_CORPUS_REPLY, Outcome::EmptyCorpus));
        }

        let hits = self.retrieve(&turn.message).await?;

        if intent::classify(&turn.message, hits.is_empty()) == Intent::SmallTalk {
            return Ok(self.small_talk(turn).await);
        }

        if hits.is_empty() {
            debug!("no candidates for recipe-seeking message");
            return Ok(Resolution::plain(NO_RESULTS_REPLY, Outcome::NoResults));
        }

        let deduped = context::dedup_by_title(hits);
        let requested = intent::requested_count(&turn.message);
        let limit = context::context_limit(requested, deduped.len());

        let sources: Vec<SourceRef> = deduped
            .iter()
            .take(limit)
            .map(|hit| SourceRef {
                title: hit.recipe.title.clone(),
                prep_time: hit.recipe.prep_time,
                cook_time: hit.recipe.cook_time,
                distance: hit.distance,
            })
            .collect();

        let request = GenerationRequest {
            intent: Intent::RecipeQuery,
            message: turn.message.clone(),
            history: turn.history.clone(),
            context: context::build_entries(&deduped, limit),
            requested_count: limit,
        };

        if self.generator.is_available().await {
            match self.generator.generate(&request).await {
                Ok(reply) => {
                    return Ok(Resolution {
                        reply,
                        sources: Some(sources),
                        llm_unavailable: false,
                        outcome: Outcome::Generated,
                    });
                }
                Err(ProviderFailure::RateLimited(msg)) => {
                    return Err(ResolverError::RateLimited(msg));
                }
                Err(err) => warn!("generation failed, using template fallback: {err}"),
            }
        } else {
            info!("generator unavailable, using template fallback");
        }

        let reply = template::synthesize(&turn.message, &deduped, limit);
        Ok(Resolution {
            reply,
            sources: Some(sources),
            llm_unavailable: true,
            outcome: Outcome::TemplateFallback,
        })
    }

    /// Two-tier retrieval: semantic when the corpus carries embeddings,
    /// lexical otherwise or when the semantic path fails.
    async fn retrieve(&self, message: &str) -> Result<Vec<RecipeHit>, ResolverError> {
        let embeddings = self.store.embedding_count().await?;
        if embeddings > 0 {
            if let Some(hits) = self.semantic(message).await? {
                return Ok(hits);
            }
        } else {
            debug!("corpus has no embeddings, lexical path only");
        }
        self.lexical(message).await.map_err(ResolverError::from)
    }

    /// Semantic retrieval. `Ok(None)` means "fall through to lexical";
    /// only a persistent rate limit is an error.
    async fn semantic(&self, message: &str) -> Result<Option<Vec<RecipeHit>>, ResolverError> {
        let vector = match self.embedder.embed(message).await {
            Ok(v) => v,
            Err(ProviderFailure::RateLimited(msg)) => {
                return Err(ResolverError::RateLimited(msg));
            }
            Err(err) => {
                warn!("embedding failed, falling back to lexical: {err}");
                return Ok(None);
            }
        };

        match self.store.nearest(&vector, self.top_k).await {
            Ok(hits) => {
                debug!(hits = hits.len(), "semantic retrieval");
                Ok(Some(hits))
            }
            Err(err) => {
                warn!("vector search failed, falling back to lexical: {err}");
                Ok(None)
            }
        }
    }

    /// Lexical retrieval over the term-matched candidate set; an unranked
    /// sample when the message yields no usable terms.
    async fn lexical(&self, message: &str) -> Result<Vec<RecipeHit>, StoreError> {
        let terms = lexical::tokenize(message);
        if terms.is_empty() {
            debug!("no usable terms, sampling corpus");
            let sample = self.store.sample(self.top_k).await?;
            return Ok(sample
                .into_iter()
                .map(|recipe| RecipeHit {
                    recipe,
                    distance: lexical::NEUTRAL_DISTANCE,
                })
                .collect());
        }

        let candidates = self.store.candidates(&terms).await?;
        let hits = lexical::rank(&candidates, &terms, self.top_k as usize);
        debug!(terms = terms.len(), hits = hits.len(), "lexical retrieval");
        Ok(hits)
    }

    /// Greeting reply, generated when possible and canned otherwise. Never
    /// fails: small talk is not worth surfacing provider errors for.
    async fn small_talk(&self, turn: &ConversationTurn) -> Resolution {
        let reply = if self.generator.is_available().await {
            let request = GenerationRequest {
                intent: Intent::SmallTalk,
                message: turn.message.clone(),
                history: turn.history.clone(),
                context: Vec::new(),
                requested_count: 0,
            };
            match self.generator.generate(&request).await {
                Ok(text) => text,
                Err(err) => {
                    debug!("small talk generation failed, using canned reply: {err}");
                    SMALL_TALK_REPLY.to_string()
                }
            }
        } else {
            SMALL_TALK_REPLY.to_string()
        };

        Resolution {
            reply,
            sources: None,
            llm_unavailable: false,
            outcome: Outcome::SmallTalk,
        }
    }
}
