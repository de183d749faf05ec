//! POST /api/query — resolves one chat turn to a reply.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use resolver::ConversationTurn;
use tracing::info;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::query::{
        query_request::QueryRequest,
        query_response::{ModelCheckResponse, QueryResponse},
    },
};

/// Sentinel message: the client asks whether the generation model is up
/// instead of posing a real question. No retrieval happens.
const MODEL_CHECK_SENTINEL: &str = "__check_model__";

/// Handler: POST /api/query
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/api/query \
///   -H 'content-type: application/json' \
///   -d '{"message":"give me 2 quick pasta recipes"}'
/// ```
pub async fn query(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> AppResult<Response> {
    // Malformed JSON still answers in the `{ reply, error }` shape.
    let Json(body) = payload?;

    let message = body.message.unwrap_or_default();
    let message = message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest(
            "Please type a message so I can help you find a recipe.".into(),
        ));
    }

    if message == MODEL_CHECK_SENTINEL {
        let model_available = state.profiles.generation_available().await;
        let reply = if model_available {
            "The language model is ready."
        } else {
            "The language model is not available right now. Replies will use a simpler format."
        };
        return Ok(Json(ModelCheckResponse {
            model_available,
            reply: reply.into(),
        })
        .into_response());
    }

    let turn = ConversationTurn {
        message: message.to_string(),
        history: body.history,
    };

    let resolution = state.resolver.resolve(&turn).await?;
    info!(outcome = ?resolution.outcome, "query resolved");

    Ok(Json(QueryResponse {
        reply: resolution.reply,
        sources: resolution.sources,
        llm_unavailable: resolution.llm_unavailable,
    })
    .into_response())
}
