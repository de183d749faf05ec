//! End-to-end pipeline tests against in-memory fakes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use recipe_store::{Recipe, RecipeHit, StoreError};
use resolver::traits::BoxFuture;
use resolver::{
    ConversationTurn, EmbeddingProvider, GenerationRequest, Outcome, ProviderFailure,
    RecipeSource, Resolver, ResolverError, TextGenerator,
};

fn recipe(id: i64, title: &str, ingredients: &str) -> Recipe {
    Recipe {
        id,
        title: title.to_string(),
        ingredients: Some(ingredients.to_string()),
        instructions: Some("Combine everything and cook.".to_string()),
        prep_time: Some(10),
        cook_time: Some(20),
        total_time: Some(30),
        cuisine: Some("Italian".to_string()),
        tags: None,
        url: None,
        image: None,
        recipe_yield: None,
        created_at: None,
    }
}

fn pasta_corpus(n: i64) -> Vec<Recipe> {
    (1..=n)
        .map(|i| recipe(i, &format!("Pasta Dish {i}"), "pasta, tomato, cheese"))
        .collect()
}

#[derive(Default)]
struct FakeStore {
    recipes: Vec<Recipe>,
    embeddings: i64,
    nearest_hits: Vec<RecipeHit>,
    nearest_fails: bool,
    seen_terms: std::sync::Mutex<Vec<String>>,
}

fn field_matches(value: Option<&str>, term: &str) -> bool {
    value
        .map(|v| v.to_lowercase().contains(term))
        .unwrap_or(false)
}

impl RecipeSource for FakeStore {
    fn recipe_count<'a>(&'a self) -> BoxFuture<'a, Result<i64, StoreError>> {
        let n = self.recipes.len() as i64;
        Box::pin(async move { Ok(n) })
    }

    fn embedding_count<'a>(&'a self) -> BoxFuture<'a, Result<i64, StoreError>> {
        let n = self.embeddings;
        Box::pin(async move { Ok(n) })
    }

    fn nearest<'a>(
        &'a self,
        _query: &'a [f32],
        k: i64,
    ) -> BoxFuture<'a, Result<Vec<RecipeHit>, StoreError>> {
        let fails = self.nearest_fails;
        let mut hits = self.nearest_hits.clone();
        hits.truncate(k as usize);
        Box::pin(async move {
            if fails {
                return Err(StoreError::DimensionMismatch { got: 0, want: 384 });
            }
            Ok(hits)
        })
    }

    fn candidates<'a>(
        &'a self,
        terms: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<Recipe>, StoreError>> {
        self.seen_terms
            .lock()
            .unwrap()
            .extend(terms.iter().cloned());
        // Only term-matched rows come back, matching the store contract.
        let matched: Vec<Recipe> = self
            .recipes
            .iter()
            .filter(|r| {
                terms.iter().any(|t| {
                    r.title.to_lowercase().contains(t)
                        || field_matches(r.ingredients.as_deref(), t)
                        || field_matches(r.instructions.as_deref(), t)
                })
            })
            .cloned()
            .collect();
        Box::pin(async move { Ok(matched) })
    }

    fn sample<'a>(&'a self, k: i64) -> BoxFuture<'a, Result<Vec<Recipe>, StoreError>> {
        let mut recipes = self.recipes.clone();
        recipes.truncate(k as usize);
        Box::pin(async move { Ok(recipes) })
    }
}

struct FakeEmbedder {
    result: Result<Vec<f32>, ProviderFailure>,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    fn ok() -> Self {
        Self {
            result: Ok(vec![0.0; 384]),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(failure: ProviderFailure) -> Self {
        Self {
            result: Err(failure),
            calls: AtomicUsize::new(0),
        }
    }
}

impl EmbeddingProvider for FakeEmbedder {
    fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, ProviderFailure>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self.result.clone();
        Box::pin(async move { result })
    }
}

struct FakeGenerator {
    available: bool,
    result: Result<String, ProviderFailure>,
    calls: AtomicUsize,
    last_count: AtomicUsize,
}

impl FakeGenerator {
    fn replying(text: &str) -> Self {
        Self {
            available: true,
            result: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            last_count: AtomicUsize::new(usize::MAX),
        }
    }

    fn offline() -> Self {
        Self {
            available: false,
            result: Err(ProviderFailure::Unavailable("offline".to_string())),
            calls: AtomicUsize::new(0),
            last_count: AtomicUsize::new(usize::MAX),
        }
    }

    fn failing(failure: ProviderFailure) -> Self {
        Self {
            available: true,
            result: Err(failure),
            calls: AtomicUsize::new(0),
            last_count: AtomicUsize::new(usize::MAX),
        }
    }
}

impl TextGenerator for FakeGenerator {
    fn is_available<'a>(&'a self) -> BoxFuture<'a, bool> {
        let available = self.available;
        Box::pin(async move { available })
    }

    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<String, ProviderFailure>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_count
            .store(request.requested_count, Ordering::SeqCst);
        let result = self.result.clone();
        Box::pin(async move { result })
    }
}

fn turn(message: &str) -> ConversationTurn {
    ConversationTurn {
        message: message.to_string(),
        history: vec![],
    }
}

fn build(
    store: FakeStore,
    embedder: FakeEmbedder,
    generator: FakeGenerator,
) -> (Resolver, Arc<FakeEmbedder>, Arc<FakeGenerator>) {
    let embedder = Arc::new(embedder);
    let generator = Arc::new(generator);
    let resolver = Resolver::new(Arc::new(store), embedder.clone(), generator.clone());
    (resolver, embedder, generator)
}

#[tokio::test]
async fn empty_corpus_short_circuits_without_provider_calls() {
    let store = FakeStore::default();
    let (resolver, embedder, generator) =
        build(store, FakeEmbedder::ok(), FakeGenerator::replying("x"));

    let res = resolver.resolve(&turn("pasta recipes")).await.unwrap();

    assert_eq!(res.outcome, Outcome::EmptyCorpus);
    assert!(res.sources.is_none());
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn embeddingless_corpus_uses_lexical_path_only() {
    let store = FakeStore {
        recipes: pasta_corpus(5),
        embeddings: 0,
        ..Default::default()
    };
    let (resolver, embedder, _generator) =
        build(store, FakeEmbedder::ok(), FakeGenerator::replying("enjoy"));

    let res = resolver.resolve(&turn("pasta for dinner")).await.unwrap();

    assert_eq!(res.outcome, Outcome::Generated);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert!(res.sources.is_some());
}

#[tokio::test]
async fn semantic_hits_flow_into_generated_reply() {
    let nearest_hits = vec![
        RecipeHit {
            recipe: recipe(1, "Carbonara", "pasta, eggs, pancetta"),
            distance: 0.12,
        },
        RecipeHit {
            recipe: recipe(2, "Amatriciana", "pasta, tomato, guanciale"),
            distance: 0.2,
        },
    ];
    let store = FakeStore {
        recipes: pasta_corpus(5),
        embeddings: 5,
        nearest_hits,
        ..Default::default()
    };
    let (resolver, embedder, generator) = build(
        store,
        FakeEmbedder::ok(),
        FakeGenerator::replying("Try the carbonara."),
    );

    let res = resolver.resolve(&turn("roman pasta")).await.unwrap();

    assert_eq!(res.outcome, Outcome::Generated);
    assert_eq!(res.reply, "Try the carbonara.");
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    let sources = res.sources.unwrap();
    assert_eq!(sources[0].title, "Carbonara");
    assert!((sources[0].distance - 0.12).abs() < f64::EPSILON);
}

#[tokio::test]
async fn embedding_failure_falls_back_to_lexical() {
    let store = FakeStore {
        recipes: pasta_corpus(8),
        embeddings: 8,
        ..Default::default()
    };
    let (resolver, _embedder, _generator) = build(
        store,
        FakeEmbedder::failing(ProviderFailure::Other("boom".to_string())),
        FakeGenerator::replying("ok"),
    );

    let res = resolver.resolve(&turn("pasta with cheese")).await.unwrap();

    assert_eq!(res.outcome, Outcome::Generated);
    let sources = res.sources.unwrap();
    assert!(!sources.is_empty());
    assert!(sources.len() <= 5);
    assert!(sources.iter().all(|s| (s.distance - 0.5).abs() < f64::EPSILON));
}

#[tokio::test]
async fn vector_search_failure_falls_back_to_lexical() {
    let store = FakeStore {
        recipes: pasta_corpus(4),
        embeddings: 4,
        nearest_fails: true,
        ..Default::default()
    };
    let (resolver, embedder, _generator) =
        build(store, FakeEmbedder::ok(), FakeGenerator::replying("ok"));

    let res = resolver.resolve(&turn("pasta tonight")).await.unwrap();

    assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    assert_eq!(res.outcome, Outcome::Generated);
    assert!(res.sources.is_some());
}

#[tokio::test]
async fn rate_limited_embedding_surfaces_as_error() {
    let store = FakeStore {
        recipes: pasta_corpus(3),
        embeddings: 3,
        ..Default::default()
    };
    let (resolver, _embedder, _generator) = build(
        store,
        FakeEmbedder::failing(ProviderFailure::RateLimited("quota".to_string())),
        FakeGenerator::replying("ok"),
    );

    let err = resolver.resolve(&turn("pasta recipes")).await.unwrap_err();
    assert!(matches!(err, ResolverError::RateLimited(_)));
}

#[tokio::test]
async fn rate_limited_generator_surfaces_as_error() {
    let store = FakeStore {
        recipes: pasta_corpus(3),
        embeddings: 0,
        ..Default::default()
    };
    let (resolver, _embedder, _generator) = build(
        store,
        FakeEmbedder::ok(),
        FakeGenerator::failing(ProviderFailure::RateLimited("quota".to_string())),
    );

    let err = resolver.resolve(&turn("pasta recipes")).await.unwrap_err();
    assert!(matches!(err, ResolverError::RateLimited(_)));
}

#[tokio::test]
async fn offline_generator_yields_template_fallback() {
    let store = FakeStore {
        recipes: pasta_corpus(5),
        embeddings: 0,
        ..Default::default()
    };
    let (resolver, _embedder, generator) =
        build(store, FakeEmbedder::ok(), FakeGenerator::offline());

    let res = resolver.resolve(&turn("pasta for dinner")).await.unwrap();

    assert_eq!(res.outcome, Outcome::TemplateFallback);
    assert!(res.llm_unavailable);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    assert!(res.reply.contains("Pasta Dish 1"));
    assert!(res.sources.is_some());
}

#[tokio::test]
async fn generator_failure_yields_template_fallback() {
    let store = FakeStore {
        recipes: pasta_corpus(5),
        embeddings: 0,
        ..Default::default()
    };
    let (resolver, _embedder, generator) = build(
        store,
        FakeEmbedder::ok(),
        FakeGenerator::failing(ProviderFailure::Other("500".to_string())),
    );

    let res = resolver.resolve(&turn("pasta for dinner")).await.unwrap();

    assert_eq!(res.outcome, Outcome::TemplateFallback);
    assert!(res.llm_unavailable);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn greeting_with_empty_retrieval_is_small_talk_without_sources() {
    let store = FakeStore {
        recipes: pasta_corpus(5),
        embeddings: 0,
        ..Default::default()
    };
    let (resolver, _embedder, generator) =
        build(store, FakeEmbedder::ok(), FakeGenerator::offline());

    let res = resolver.resolve(&turn("hello")).await.unwrap();

    assert_eq!(res.outcome, Outcome::SmallTalk);
    assert!(res.sources.is_none());
    assert!(!res.llm_unavailable);
    assert!(!res.reply.is_empty());
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn requested_count_limits_context_and_sources() {
    let store = FakeStore {
        recipes: pasta_corpus(5),
        embeddings: 0,
        ..Default::default()
    };
    let (resolver, _embedder, generator) =
        build(store, FakeEmbedder::ok(), FakeGenerator::replying("two it is"));

    let res = resolver
        .resolve(&turn("give me 2 recipes with pasta"))
        .await
        .unwrap();

    assert_eq!(res.sources.unwrap().len(), 2);
    assert_eq!(generator.last_count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn three_pasta_recipes_template_lists_exactly_three() {
    let store = FakeStore {
        recipes: pasta_corpus(5),
        embeddings: 0,
        ..Default::default()
    };
    let (resolver, _embedder, _generator) =
        build(store, FakeEmbedder::ok(), FakeGenerator::offline());

    let res = resolver.resolve(&turn("3 pasta recipes")).await.unwrap();

    assert_eq!(res.outcome, Outcome::TemplateFallback);
    assert_eq!(res.sources.unwrap().len(), 3);
    assert!(res.reply.contains("Pasta Dish 1"));
    assert!(res.reply.contains("Pasta Dish 2"));
    assert!(res.reply.contains("Pasta Dish 3"));
    assert!(!res.reply.contains("Pasta Dish 4"));
    assert!(res.reply.contains("30 minutes"));
    assert!(res.reply.contains("pasta, tomato, cheese"));
}

#[tokio::test]
async fn duplicate_titles_are_deduplicated_keeping_rank_order() {
    let nearest_hits = vec![
        RecipeHit {
            recipe: recipe(1, "Pasta Bake", "pasta"),
            distance: 0.1,
        },
        RecipeHit {
            recipe: recipe(2, "PASTA BAKE", "pasta"),
            distance: 0.2,
        },
        RecipeHit {
            recipe: recipe(3, "Minestrone", "beans"),
            distance: 0.3,
        },
    ];
    let store = FakeStore {
        recipes: pasta_corpus(3),
        embeddings: 3,
        nearest_hits,
        ..Default::default()
    };
    let (resolver, _embedder, _generator) =
        build(store, FakeEmbedder::ok(), FakeGenerator::replying("done"));

    let res = resolver.resolve(&turn("pasta bake")).await.unwrap();

    let sources = res.sources.unwrap();
    let titles: Vec<&str> = sources.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Pasta Bake", "Minestrone"]);
}

#[tokio::test]
async fn lexical_candidates_are_fetched_by_search_term() {
    let mut recipes = pasta_corpus(5);
    recipes.push(recipe(987_654, "Goulash", "beef, paprika, onion"));
    let store = Arc::new(FakeStore {
        recipes,
        embeddings: 0,
        ..Default::default()
    });
    let resolver = Resolver::new(
        store.clone(),
        Arc::new(FakeEmbedder::ok()),
        Arc::new(FakeGenerator::offline()),
    );

    let res = resolver
        .resolve(&turn("goulash with paprika"))
        .await
        .unwrap();

    let seen = store.seen_terms.lock().unwrap().clone();
    assert_eq!(seen, vec!["goulash", "paprika"]);
    let sources = res.sources.unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].title, "Goulash");
}

#[tokio::test]
async fn no_matches_for_recipe_query_yields_rephrase_suggestion() {
    let store = FakeStore {
        recipes: pasta_corpus(5),
        embeddings: 0,
        ..Default::default()
    };
    let (resolver, _embedder, generator) =
        build(store, FakeEmbedder::ok(), FakeGenerator::replying("x"));

    let res = resolver
        .resolve(&turn("sushi with wasabi please"))
        .await
        .unwrap();

    assert_eq!(res.outcome, Outcome::NoResults);
    assert!(res.sources.is_none());
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}
