//! Rule-based answer synthesis, used when the generator is unavailable or
//! fails. Works directly off the retrieved records and always produces a
//! reply given at least one candidate.

use std::sync::LazyLock;

use recipe_store::RecipeHit;
use regex::Regex;

use crate::context;

/// What aspect of the recipes the message is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Ingredients,
    Timing,
    Instructions,
    General,
}

const INGREDIENTS_CHARS: usize = 160;

static INGREDIENTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bingredients?\b|\bwhat do i need\b|\bshopping\b").expect("focus regex"));
static TIMING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bhow long\b|\bminutes?\b|\bhours?\b|\bquick\b|\bfast\b|\btime\b")
        .expect("focus regex")
});
static INSTRUCTIONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bhow (?:do|to|can)\b|\bsteps?\b|\binstructions?\b|\bprepare\b")
        .expect("focus regex")
});

/// Picks the template focus from the message text.
pub fn detect_focus(message: &str) -> Focus {
    if INGREDIENTS_RE.is_match(message) {
        Focus::Ingredients
    } else if TIMING_RE.is_match(message) {
        Focus::Timing
    } else if INSTRUCTIONS_RE.is_match(message) {
        Focus::Instructions
    } else {
        Focus::General
    }
}

/// Builds a templated reply from the first `count` candidates. Candidates
/// are expected to be deduplicated and rank-ordered already.
pub fn synthesize(message: &str, hits: &[RecipeHit], count: usize) -> String {
    let picked: Vec<&RecipeHit> = hits.iter().take(count.max(1)).collect();
    if picked.is_empty() {
        return String::new();
    }

    let focus = detect_focus(message);
    let lines: Vec<String> = picked
        .iter()
        .map(|hit| describe(hit, focus))
        .collect();

    let lead = match focus {
        Focus::Ingredients => "Here is what you will need.",
        Focus::Timing => "Here is how long these take.",
        Focus::Instructions => "Here is how to make them.",
        Focus::General => {
            if picked.len() == 1 {
                "Here is a recipe you might like."
            } else {
                "Here are some recipes you might like."
            }
        }
    };

    format!("{lead} {}", lines.join(" "))
}

fn describe(hit: &RecipeHit, focus: Focus) -> String {
    let r = &hit.recipe;
    match focus {
        Focus::Ingredients => format!(
            "For {} you will need {}.",
            r.title,
            short_text(r.ingredients.as_deref(), "ingredients not listed")
        ),
        Focus::Timing => match (r.total_time, r.prep_time, r.cook_time) {
            (Some(total), Some(prep), Some(cook)) => format!(
                "{} takes {total} minutes in total, {prep} for prep and {cook} to cook.",
                r.title
            ),
            (Some(total), _, _) => format!("{} takes about {total} minutes.", r.title),
            (None, _, Some(cook)) => format!("{} cooks in about {cook} minutes.", r.title),
            _ => format!("{} has no listed time.", r.title),
        },
        Focus::Instructions => format!(
            "{}: {}",
            r.title,
            r.instructions
                .as_deref()
                .map(context::render_instructions)
                .unwrap_or_else(|| "instructions not listed.".to_string())
        ),
        Focus::General => {
            let time = r
                .total_time
                .map(|t| format!("{t} minutes"))
                .unwrap_or_else(|| "time not listed".to_string());
            let cuisine = r
                .cuisine
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .map(|c| format!(", {c} cuisine"))
                .unwrap_or_default();
            format!(
                "{} ({time}{cuisine}) uses {}.",
                r.title,
                short_text(r.ingredients.as_deref(), "unlisted ingredients")
            )
        }
    }
}

fn short_text(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => context::truncate_chars(v.trim(), INGREDIENTS_CHARS),
        _ => fallback.to_string(),
    }
}
