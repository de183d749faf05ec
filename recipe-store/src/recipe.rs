//! Core data models for the recipe corpus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

use crate::errors::StoreError;

/// A persisted recipe. Created by the offline ingestion pipeline; this
/// service only reads it.
///
/// `title` is never empty (ingestion enforces it); time fields are minutes
/// and non-negative when present. `instructions` may be plain text or a
/// JSON-encoded step array — rendering decides which.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub total_time: Option<i32>,
    pub cuisine: Option<String>,
    pub tags: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub recipe_yield: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Recipe {
    /// Maps a row selected with the canonical column list (see `pg.rs`).
    pub(crate) fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            ingredients: row.try_get("ingredients")?,
            instructions: row.try_get("instructions")?,
            prep_time: row.try_get("prep_time")?,
            cook_time: row.try_get("cook_time")?,
            total_time: row.try_get("total_time")?,
            cuisine: row.try_get("cuisine")?,
            tags: row.try_get("tags")?,
            url: row.try_get("url")?,
            image: row.try_get("image")?,
            recipe_yield: row.try_get("recipe_yield")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// A retrieval hit: one recipe plus a distance.
///
/// Both retrieval paths return this shape. For the semantic path `distance`
/// is cosine distance (0 = perfect match); the lexical path assigns the flat
/// [`crate::lexical::NEUTRAL_DISTANCE`] placeholder since its scores are not
/// comparable to vector distance.
#[derive(Clone, Debug, Serialize)]
pub struct RecipeHit {
    pub recipe: Recipe,
    pub distance: f64,
}
