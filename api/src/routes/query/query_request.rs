use resolver::ChatMessage;
use serde::Deserialize;

/// Request payload for /api/query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Chat message. Validated as non-empty by the handler so the error
    /// stays in the `{ reply, error }` shape instead of a serde rejection.
    #[serde(default)]
    pub message: Option<String>,
    /// Prior turns, oldest first. Never persisted server-side.
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}
