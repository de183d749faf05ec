//! Structured generation requests and their default prompt rendering.
//!
//! The resolver never concatenates live data into ad-hoc prompt strings; it
//! builds a [`GenerationRequest`] and the generator adapter renders it. The
//! rendering helpers here are the canonical implementation adapters reuse.

use serde::{Deserialize, Serialize};

use crate::context::ContextEntry;
use crate::intent::Intent;

/// One prior exchange in the conversation, as supplied by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Everything the generator needs to produce a reply.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub intent: Intent,
    pub message: String,
    pub history: Vec<ChatMessage>,
    pub context: Vec<ContextEntry>,
    /// How many recipes the reply should cover. Ignored for small talk.
    pub requested_count: usize,
}

/// Recent turns included in the rendered prompt.
const HISTORY_WINDOW: usize = 6;

const RECIPE_SYSTEM: &str = "You are a friendly cooking assistant for a recipe recommendation \
service. Answer using only the recipes provided in the prompt. If none of them fit the \
question, say so plainly instead of inventing a recipe. Reply in plain conversational \
sentences without markdown, bullet points, or special characters, because the reply may be \
read aloud.";

const SMALL_TALK_SYSTEM: &str = "You are a friendly cooking assistant. The user is making \
small talk. Reply briefly and warmly in one or two plain sentences, and invite them to ask \
about recipes. Do not invent recipes.";

/// System instruction matching the request intent.
pub fn system_for(intent: Intent) -> &'static str {
    match intent {
        Intent::RecipeQuery => RECIPE_SYSTEM,
        Intent::SmallTalk => SMALL_TALK_SYSTEM,
    }
}

/// Renders the user-side prompt text for a request.
pub fn render(request: &GenerationRequest) -> String {
    let mut out = String::new();

    if !request.context.is_empty() {
        out.push_str("These are the only recipes you know about:\n\n");
        for (i, entry) in request.context.iter().enumerate() {
            out.push_str(&format!("Recipe {}:\n", i + 1));
            out.push_str(&format!("Title: {}\n", entry.title));
            out.push_str(&format!("Ingredients: {}\n", entry.ingredients));
            out.push_str(&format!("Instructions: {}\n", entry.instructions));
            out.push_str(&format!(
                "Prep time: {}. Cook time: {}. Total time: {}.\n",
                entry.prep_time, entry.cook_time, entry.total_time
            ));
            out.push_str(&format!("Cuisine: {}\n\n", entry.cuisine));
        }
    }

    if !request.history.is_empty() {
        out.push_str("Conversation so far:\n");
        let skip = request.history.len().saturating_sub(HISTORY_WINDOW);
        for turn in request.history.iter().skip(skip) {
            let speaker = if turn.role.eq_ignore_ascii_case("assistant") {
                "Assistant"
            } else {
                "User"
            };
            out.push_str(&format!("{speaker}: {}\n", turn.content));
        }
        out.push('\n');
    }

    out.push_str(&format!("User question: {}\n", request.message));

    if request.intent == Intent::RecipeQuery {
        let noun = if request.requested_count == 1 {
            "recipe"
        } else {
            "recipes"
        };
        out.push_str(&format!(
            "\nMention at most {} {noun} from the list above.",
            request.requested_count
        ));
    }

    out
}
