//! Typed error for the resolver crate.
//!
//! Deliberately small: almost every upstream failure is downgraded to the
//! next pipeline strategy instead of being returned. What remains is the
//! set of failures with no useful fallback.

use recipe_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    /// Store failure with no remaining retrieval fallback (corpus counts,
    /// or the lexical path itself).
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A provider stayed rate-limited through its bounded retry.
    #[error("provider rate limited: {0}")]
    RateLimited(String),
}
