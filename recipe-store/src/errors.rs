//! Unified error type for store operations.

use thiserror::Error;

/// Top-level error for recipe-store operations.
///
/// Postgres does not guarantee stable error codes across versions for the
/// failure modes we care about (missing extension, missing migration,
/// connectivity), so the API layer classifies `Postgres` variants by message
/// substring into remediation text.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Required environment variable is missing or empty.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// Any error surfaced by the Postgres driver, including connect failures.
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// The query vector does not match the corpus dimensionality.
    #[error("query vector has dimension {got}, corpus expects {want}")]
    DimensionMismatch { got: usize, want: usize },
}
