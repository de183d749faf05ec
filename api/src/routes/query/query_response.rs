use resolver::SourceRef;
use serde::Serialize;

/// Response payload for /api/query.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// Final reply text (plain sentences; the client may read it aloud).
    pub reply: String,
    /// Recipes the reply drew on. Absent for small talk and no-result turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceRef>>,
    /// Present (true) only when the reply came from the template fallback
    /// because the generator was unavailable or failed.
    #[serde(skip_serializing_if = "is_false")]
    pub llm_unavailable: bool,
}

/// Response payload for the model-availability sentinel message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCheckResponse {
    pub model_available: bool,
    pub reply: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}
