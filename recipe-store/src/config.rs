//! Runtime configuration for store access.

use crate::errors::StoreError;

/// Configuration for the Postgres/pgvector corpus.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Postgres connection string (`postgres://...`).
    pub database_url: String,
    /// Dimensionality of the stored vectors. The offline pipeline produces
    /// normalized 384-dim embeddings (all-MiniLM-L6-v2), and query vectors
    /// are validated against this before search.
    pub embedding_dim: usize,
    /// Upper bound on term-matched rows fetched for in-process lexical
    /// scoring.
    pub lexical_scan_cap: i64,
}

impl StoreConfig {
    /// Builds the config from environment variables.
    ///
    /// # Env
    /// - `DATABASE_URL` (required)
    /// - `EMBEDDING_DIM` (default 384)
    /// - `LEXICAL_SCAN_CAP` (default 500)
    pub fn from_env() -> Result<Self, StoreError> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(StoreError::MissingVar("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            embedding_dim: parse("EMBEDDING_DIM", 384),
            lexical_scan_cap: parse("LEXICAL_SCAN_CAP", 500i64),
        })
    }
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(dflt)
}
