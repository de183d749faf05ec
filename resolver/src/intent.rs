//! Intent classification and requested-count extraction.
//!
//! Deliberately conservative: any non-empty retrieval result routes to the
//! recipe-answering path regardless of phrasing, because a near-miss
//! retrieval is still more useful than a canned greeting reply.

use std::sync::LazyLock;

use regex::Regex;

/// What the current turn is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    SmallTalk,
    RecipeQuery,
}

/// Exact-match greeting/courtesy set (compared after lowercasing and
/// stripping surrounding punctuation).
const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hey there",
    "hi there",
    "yo",
    "good morning",
    "good afternoon",
    "good evening",
    "thanks",
    "thank you",
    "bye",
    "goodbye",
    "see you",
    "help",
    "ok",
    "okay",
];

/// Keywords that mark a short message as food-related anyway.
const COOKING_KEYWORDS: &[&str] = &[
    "cook", "recipe", "food", "eat", "dish", "meal", "bake", "fry", "roast", "grill", "dinner",
    "lunch", "breakfast", "dessert", "snack", "soup", "ingredient",
];

/// Messages shorter than this with no cooking keyword count as small talk.
const SHORT_MESSAGE_CHARS: usize = 10;

/// Classifies the turn. `retrieval_empty` is whether retrieval produced zero
/// candidates for this message.
pub fn classify(message: &str, retrieval_empty: bool) -> Intent {
    if !retrieval_empty {
        return Intent::RecipeQuery;
    }

    let normalized = message.trim().to_lowercase();
    let stripped =
        normalized.trim_matches(|ch: char| ch.is_ascii_punctuation() || ch.is_whitespace());

    if GREETINGS.contains(&stripped) {
        return Intent::SmallTalk;
    }

    let mentions_food = COOKING_KEYWORDS.iter().any(|kw| normalized.contains(kw));
    if normalized.chars().count() < SHORT_MESSAGE_CHARS && !mentions_food {
        return Intent::SmallTalk;
    }

    Intent::RecipeQuery
}

/// Upper bound on how many recipes a single reply will cover.
pub const MAX_REQUESTED: usize = 10;

static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    // First integer token, optionally followed by "recipe(s)"/"dish(es)".
    Regex::new(r"\b(\d+)\b(?:\s*(?:recipes?|dishes?))?").expect("count regex")
});

/// Extracts how many recipes the user asked for, if they named a number.
/// Clamped to [`MAX_REQUESTED`]; zero is treated as no request.
pub fn requested_count(message: &str) -> Option<usize> {
    let caps = COUNT_RE.captures(message)?;
    // Parse only fails on overflow past usize, which still means "a lot".
    let n: usize = caps[1].parse().unwrap_or(MAX_REQUESTED);
    if n == 0 {
        return None;
    }
    Some(n.min(MAX_REQUESTED))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_is_small_talk_when_retrieval_is_empty() {
        assert_eq!(classify("hello", true), Intent::SmallTalk);
        assert_eq!(classify("  Hello!! ", true), Intent::SmallTalk);
        assert_eq!(classify("thank you", true), Intent::SmallTalk);
    }

    #[test]
    fn non_empty_retrieval_always_routes_to_recipes() {
        assert_eq!(classify("hello", false), Intent::RecipeQuery);
        assert_eq!(classify("hi", false), Intent::RecipeQuery);
    }

    #[test]
    fn short_message_without_food_words_is_small_talk() {
        assert_eq!(classify("how r u", true), Intent::SmallTalk);
    }

    #[test]
    fn short_message_with_food_word_is_a_query() {
        assert_eq!(classify("food?", true), Intent::RecipeQuery);
        assert_eq!(classify("soup", true), Intent::RecipeQuery);
    }

    #[test]
    fn long_message_is_a_query_even_with_empty_retrieval() {
        assert_eq!(
            classify("what can I do with leftover rice", true),
            Intent::RecipeQuery
        );
    }

    #[test]
    fn requested_count_takes_first_integer() {
        assert_eq!(requested_count("give me 2 recipes with chicken"), Some(2));
        assert_eq!(requested_count("3 pasta recipes"), Some(3));
        assert_eq!(requested_count("show 4 dishes, not 9"), Some(4));
    }

    #[test]
    fn requested_count_absent_or_zero() {
        assert_eq!(requested_count("pasta recipes"), None);
        assert_eq!(requested_count("0 recipes"), None);
    }

    #[test]
    fn requested_count_is_clamped() {
        assert_eq!(requested_count("100 recipes please"), Some(MAX_REQUESTED));
        assert_eq!(requested_count("2000 recipes"), Some(MAX_REQUESTED));
        assert_eq!(
            requested_count("99999999999999999999999 recipes"),
            Some(MAX_REQUESTED)
        );
    }
}
