//! Context building: dedup, sizing, and per-recipe context entries.

use recipe_store::RecipeHit;
use serde::Serialize;

/// Entries included when the user did not name a count.
pub const DEFAULT_CONTEXT_SIZE: usize = 3;

/// Soft cap on the instructions excerpt, in characters.
pub const INSTRUCTIONS_EXCERPT_CHARS: usize = 400;

const NOT_SPECIFIED: &str = "Not specified";

/// One recipe as presented to the generator. All fields are pre-rendered
/// strings; absent source fields appear as "Not specified".
#[derive(Debug, Clone, Serialize)]
pub struct ContextEntry {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub prep_time: String,
    pub cook_time: String,
    pub total_time: String,
    pub cuisine: String,
}

/// Drops candidates whose title equals an earlier candidate's title,
/// case-insensitively. First occurrence (highest rank) wins; rank order is
/// preserved.
pub fn dedup_by_title(hits: Vec<RecipeHit>) -> Vec<RecipeHit> {
    let mut seen: Vec<String> = Vec::with_capacity(hits.len());
    let mut out = Vec::with_capacity(hits.len());
    for hit in hits {
        let key = hit.recipe.title.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(hit);
    }
    out
}

/// How many entries the context block may hold: the requested count when the
/// user named one, otherwise [`DEFAULT_CONTEXT_SIZE`], never more than the
/// deduplicated candidate count.
pub fn context_limit(requested: Option<usize>, deduped: usize) -> usize {
    requested.unwrap_or(DEFAULT_CONTEXT_SIZE).min(deduped)
}

/// Renders the first `limit` deduplicated hits into context entries.
pub fn build_entries(hits: &[RecipeHit], limit: usize) -> Vec<ContextEntry> {
    hits.iter()
        .take(limit)
        .map(|hit| {
            let r = &hit.recipe;
            ContextEntry {
                title: r.title.clone(),
                ingredients: text_or_not_specified(r.ingredients.as_deref()),
                instructions: r
                    .instructions
                    .as_deref()
                    .map(render_instructions)
                    .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
                prep_time: minutes_or_not_specified(r.prep_time),
                cook_time: minutes_or_not_specified(r.cook_time),
                total_time: minutes_or_not_specified(r.total_time),
                cuisine: text_or_not_specified(r.cuisine.as_deref()),
            }
        })
        .collect()
}

/// Renders raw instructions into a bounded excerpt. A JSON-encoded step array
/// becomes a numbered list first; anything else passes through as-is.
pub fn render_instructions(raw: &str) -> String {
    let rendered = match serde_json::from_str::<Vec<String>>(raw) {
        Ok(steps) if !steps.is_empty() => steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step.trim()))
            .collect::<Vec<_>>()
            .join(" "),
        _ => raw.to_string(),
    };
    truncate_chars(&rendered, INSTRUCTIONS_EXCERPT_CHARS)
}

/// Truncates on a character boundary, appending "..." when anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}

fn text_or_not_specified(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => NOT_SPECIFIED.to_string(),
    }
}

fn minutes_or_not_specified(value: Option<i32>) -> String {
    match value {
        Some(m) => format!("{m} minutes"),
        None => NOT_SPECIFIED.to_string(),
    }
}
