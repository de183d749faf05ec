//! Read-only access to the recipe corpus.
//!
//! The corpus lives in Postgres with the pgvector extension: a `recipes`
//! table and a one-to-one `embeddings` table holding 384-dimensional
//! vectors produced by an offline ingestion pipeline. This crate never
//! writes; it exposes counts, nearest-neighbor search, and the candidate
//! fetches the lexical fallback scores in-process.

pub mod config;
pub mod errors;
pub mod lexical;
pub mod pg;
pub mod recipe;

pub use config::StoreConfig;
pub use errors::StoreError;
pub use pg::PgRecipeStore;
pub use recipe::{Recipe, RecipeHit};
