//! Application error type and its HTTP mapping.
//!
//! Every error renders as `{ reply, error }` JSON: `reply` is user-facing
//! remediation text a chat client can show directly, `error` a stable
//! machine-readable code. Store failures are classified by message-substring
//! heuristics to avoid importing driver types here.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use llm_service::LlmError;
use recipe_store::StoreError;
use resolver::ResolverError;
use serde::Serialize;
use thiserror::Error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    #[error(transparent)]
    Llm(#[from] LlmError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("{0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{reply}")]
    Http {
        status: StatusCode,
        code: &'static str,
        reply: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingEnv(_) => StatusCode::INTERNAL_SERVER_ERROR, // startup-only
            AppError::Llm(_) => StatusCode::INTERNAL_SERVER_ERROR,        // startup-only
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,

            AppError::Http { status, .. } => *status,

            AppError::Bind(_) | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingEnv(_) => "MISSING_ENV",
            AppError::Llm(_) => "LLM_CONFIG",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    reply: String,
    error: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            reply: self.to_string(),
            error: self.error_code(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<ResolverError> for AppError {
    fn from(err: ResolverError) -> Self {
        match err {
            ResolverError::RateLimited(_) => AppError::Http {
                status: StatusCode::TOO_MANY_REQUESTS,
                code: "RATE_LIMITED",
                reply: "The language model is handling too many requests right now. \
                        Please try again in a moment."
                    .into(),
            },
            ResolverError::Store(err) => err.into(),
        }
    }
}

/// Convert `StoreError` to `AppError::Http` with a remediation reply.
/// Uses text heuristics to avoid importing `tokio_postgres` types here.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingVar(name) => AppError::MissingEnv(name),
            StoreError::DimensionMismatch { .. } => AppError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "EMBEDDING_MISMATCH",
                reply: "The embedding model does not match the stored vectors. \
                        Re-run the embedding ingestion with the configured model."
                    .into(),
            },
            StoreError::Postgres(e) => {
                let msg = e.to_string();
                let lower = msg.to_lowercase();

                if lower.contains("vector")
                    && (lower.contains("extension")
                        || lower.contains("does not exist")
                        || lower.contains("unknown type"))
                {
                    AppError::Http {
                        status: StatusCode::INTERNAL_SERVER_ERROR,
                        code: "VECTOR_EXTENSION_MISSING",
                        reply: "The database is missing the pgvector extension. \
                                Install it and re-run the schema migration."
                            .into(),
                    }
                } else if lower.contains("relation") && lower.contains("does not exist") {
                    AppError::Http {
                        status: StatusCode::INTERNAL_SERVER_ERROR,
                        code: "SCHEMA_MISSING",
                        reply: "The recipe tables are missing. Run the database \
                                migration before querying."
                            .into(),
                    }
                } else if lower.contains("connection refused")
                    || lower.contains("connection closed")
                    || lower.contains("connection reset")
                    || lower.contains("timed out")
                {
                    AppError::Http {
                        status: StatusCode::INTERNAL_SERVER_ERROR,
                        code: "DB_UNAVAILABLE",
                        reply: "The recipe database is unreachable. Check that \
                                Postgres is running and DATABASE_URL is correct."
                            .into(),
                    }
                } else {
                    AppError::Http {
                        status: StatusCode::INTERNAL_SERVER_ERROR,
                        code: "STORE_ERROR",
                        reply: format!("Something went wrong reading the recipes: {msg}"),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_maps_to_429() {
        let err: AppError = ResolverError::RateLimited("quota".into()).into();
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.error_code(), "RATE_LIMITED");
    }

    #[test]
    fn dimension_mismatch_has_remediation_code() {
        let err: AppError = StoreError::DimensionMismatch { got: 768, want: 384 }.into();
        assert_eq!(err.error_code(), "EMBEDDING_MISMATCH");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_request_maps_to_400() {
        let err = AppError::BadRequest("empty message".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "empty message");
    }

    #[tokio::test]
    async fn error_response_body_is_reply_plus_code() {
        let res = AppError::BadRequest("invalid request body".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["reply"], "invalid request body");
        assert_eq!(body["error"], "BAD_REQUEST");
    }
}
