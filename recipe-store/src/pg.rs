//! Postgres/pgvector store client.
//!
//! Owns a single async connection (the driver task is spawned at connect
//! time) and the prepared SQL text for each read path. Cosine distance
//! (`<=>`) matches the metric the corpus index was built with; the stored
//! vectors are normalized by the ingestion pipeline.

use std::sync::Arc;

use pgvector::Vector;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, instrument};

use crate::config::StoreConfig;
use crate::errors::StoreError;
use crate::recipe::{Recipe, RecipeHit};

const RECIPE_COLUMNS: &[&str] = &[
    "id",
    "title",
    "ingredients",
    "instructions",
    "prep_time",
    "cook_time",
    "total_time",
    "cuisine",
    "tags",
    "url",
    "image",
    "recipe_yield",
    "created_at",
];

/// Renders the canonical column list, optionally qualified with an alias.
fn recipe_columns(alias: Option<&str>) -> String {
    RECIPE_COLUMNS
        .iter()
        .map(|c| match alias {
            Some(a) => format!("{a}.{c}"),
            None => (*c).to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read-only handle over the recipe corpus.
///
/// Cheap to clone via the inner `Arc`; construct once at startup and share
/// across request handlers.
/// `ILIKE` patterns for the extracted search terms. Terms come from the
/// tokenizer, which keeps alphanumeric runs only, so no wildcard escaping is
/// needed.
fn like_patterns(terms: &[String]) -> Vec<String> {
    terms.iter().map(|t| format!("%{t}%")).collect()
}

#[derive(Clone)]
pub struct PgRecipeStore {
    client: Arc<Client>,
    cfg: StoreConfig,
    nearest_sql: Arc<String>,
    candidates_sql: Arc<String>,
    sample_sql: Arc<String>,
}

impl PgRecipeStore {
    /// Connects to Postgres and spawns the connection driver task.
    pub async fn connect(cfg: StoreConfig) -> Result<Self, StoreError> {
        let (client, connection) = tokio_postgres::connect(&cfg.database_url, NoTls).await?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                error!("postgres connection error: {err}");
            }
        });

        let nearest_sql = Arc::new(format!(
            "SELECT {cols}, (e.vector <=> $1)::float8 AS distance \
             FROM embeddings e \
             JOIN recipes r ON r.id = e.recipe_id \
             ORDER BY e.vector <=> $1 ASC \
             LIMIT $2",
            cols = recipe_columns(Some("r"))
        ));

        let candidates_sql = Arc::new(format!(
            "SELECT {cols} FROM recipes \
             WHERE title ILIKE ANY($1) \
                OR ingredients ILIKE ANY($1) \
                OR instructions ILIKE ANY($1) \
             ORDER BY id ASC \
             LIMIT $2",
            cols = recipe_columns(None)
        ));

        let sample_sql = Arc::new(format!(
            "SELECT {cols} FROM recipes ORDER BY id ASC LIMIT $1",
            cols = recipe_columns(None)
        ));

        Ok(Self {
            client: Arc::new(client),
            cfg,
            nearest_sql,
            candidates_sql,
            sample_sql,
        })
    }

    /// Number of recipes in the corpus.
    pub async fn recipe_count(&self) -> Result<i64, StoreError> {
        let row = self
            .client
            .query_one("SELECT COUNT(*) FROM recipes", &[])
            .await?;
        Ok(row.get(0))
    }

    /// Number of embeddings in the corpus.
    pub async fn embedding_count(&self) -> Result<i64, StoreError> {
        let row = self
            .client
            .query_one("SELECT COUNT(*) FROM embeddings", &[])
            .await?;
        Ok(row.get(0))
    }

    /// Top-`k` recipes nearest to `query` by cosine distance, ascending.
    ///
    /// # Errors
    /// [`StoreError::DimensionMismatch`] when the query vector length does
    /// not match the corpus dimensionality; driver errors otherwise.
    #[instrument(skip_all, fields(k))]
    pub async fn nearest(&self, query: &[f32], k: i64) -> Result<Vec<RecipeHit>, StoreError> {
        if query.len() != self.cfg.embedding_dim {
            return Err(StoreError::DimensionMismatch {
                got: query.len(),
                want: self.cfg.embedding_dim,
            });
        }

        let vector = Vector::from(query.to_vec());
        let rows = self
            .client
            .query(self.nearest_sql.as_str(), &[&vector, &k])
            .await?;

        debug!(hits = rows.len(), "vector search completed");

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let recipe = Recipe::from_row(&row)?;
            let distance: f64 = row.try_get("distance")?;
            out.push(RecipeHit { recipe, distance });
        }
        Ok(out)
    }

    /// Candidate recipes for in-process lexical scoring: rows where any
    /// search term occurs in title, ingredients, or instructions.
    /// Prefiltered in SQL so the whole corpus participates regardless of id;
    /// ascending id, bounded by the configured scan cap.
    #[instrument(skip_all, fields(terms = terms.len()))]
    pub async fn candidates(&self, terms: &[String]) -> Result<Vec<Recipe>, StoreError> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let patterns = like_patterns(terms);
        let rows = self
            .client
            .query(
                self.candidates_sql.as_str(),
                &[&patterns, &self.cfg.lexical_scan_cap],
            )
            .await?;

        debug!(candidates = rows.len(), "lexical candidate fetch");
        rows.iter().map(Recipe::from_row).collect()
    }

    /// Unranked sample of `k` recipes in defined order (ascending id). Used
    /// when a message yields no usable search terms.
    pub async fn sample(&self, k: i64) -> Result<Vec<Recipe>, StoreError> {
        let rows = self.client.query(self.sample_sql.as_str(), &[&k]).await?;
        rows.iter().map(Recipe::from_row).collect()
    }
}
