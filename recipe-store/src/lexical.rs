//! Lexical fallback retrieval: term extraction and weighted scoring.
//!
//! Used whenever the semantic path is unavailable (no embeddings in the
//! corpus, embedding provider down, vector search failure). Scoring is
//! deterministic: identical message + identical corpus state always yields
//! the same ordering.

use crate::recipe::{Recipe, RecipeHit};

/// Flat placeholder distance assigned to lexical hits.
pub const NEUTRAL_DISTANCE: f64 = 0.5;

/// Term weight when it occurs in the ingredients field.
const WEIGHT_INGREDIENTS: u32 = 3;
/// Term weight when it occurs in the title.
const WEIGHT_TITLE: u32 = 2;
/// Term weight when it occurs in the instructions.
const WEIGHT_INSTRUCTIONS: u32 = 1;

/// Small stopword set stripped from query terms.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "you", "your", "can", "how", "what", "are", "this", "that",
    "have", "has", "was", "were", "will", "would", "could", "should", "about", "from", "into",
    "some", "any", "give", "show", "find", "want", "need", "please", "recipe", "recipes", "dish",
    "dishes", "make", "made", "get", "got", "something", "anything",
];

/// Tokenizes a message into search terms: lowercase alphanumeric runs longer
/// than 2 characters, stopwords removed, first occurrence order preserved.
pub fn tokenize(message: &str) -> Vec<String> {
    let mut terms = Vec::new();
    for token in message
        .to_lowercase()
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|tok| tok.len() > 2)
    {
        if STOPWORDS.contains(&token) {
            continue;
        }
        if !terms.iter().any(|t| t == token) {
            terms.push(token.to_string());
        }
    }
    terms
}

/// Scores one recipe against the extracted terms by weighted field presence:
/// ingredients weigh highest, then title, then instructions.
pub fn score(recipe: &Recipe, terms: &[String]) -> u32 {
    let title = recipe.title.to_lowercase();
    let ingredients = recipe
        .ingredients
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();
    let instructions = recipe
        .instructions
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();

    let mut total = 0u32;
    for term in terms {
        if ingredients.contains(term.as_str()) {
            total += WEIGHT_INGREDIENTS;
        }
        if title.contains(term.as_str()) {
            total += WEIGHT_TITLE;
        }
        if instructions.contains(term.as_str()) {
            total += WEIGHT_INSTRUCTIONS;
        }
    }
    total
}

/// Ranks candidates by descending score (ascending id breaks ties), keeping
/// at most `k` scored hits. Recipes with zero score are dropped.
pub fn rank(candidates: &[Recipe], terms: &[String], k: usize) -> Vec<RecipeHit> {
    let mut scored: Vec<(u32, &Recipe)> = candidates
        .iter()
        .map(|r| (score(r, terms), r))
        .filter(|(s, _)| *s > 0)
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.id.cmp(&b.1.id)));
    scored.truncate(k);

    scored
        .into_iter()
        .map(|(_, r)| RecipeHit {
            recipe: r.clone(),
            distance: NEUTRAL_DISTANCE,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(id: i64, title: &str, ingredients: &str, instructions: &str) -> Recipe {
        Recipe {
            id,
            title: title.to_string(),
            ingredients: Some(ingredients.to_string()),
            instructions: Some(instructions.to_string()),
            prep_time: None,
            cook_time: None,
            total_time: None,
            cuisine: None,
            tags: None,
            url: None,
            image: None,
            recipe_yield: None,
            created_at: None,
        }
    }

    #[test]
    fn tokenize_strips_stopwords_and_short_tokens() {
        let terms = tokenize("Give me a recipe with chicken and rice!");
        assert_eq!(terms, vec!["chicken", "rice"]);
    }

    #[test]
    fn tokenize_dedups_preserving_order() {
        let terms = tokenize("pasta pasta tomato pasta");
        assert_eq!(terms, vec!["pasta", "tomato"]);
    }

    #[test]
    fn ingredients_outweigh_title() {
        let by_title = recipe(1, "chicken soup", "water, salt", "boil");
        let by_ingredients = recipe(2, "grandma soup", "chicken, water", "boil");
        let terms = tokenize("chicken");
        assert!(score(&by_ingredients, &terms) > score(&by_title, &terms));
    }

    #[test]
    fn rank_is_deterministic_and_tie_breaks_by_id() {
        let candidates = vec![
            recipe(7, "pasta bake", "pasta, cheese", "bake it"),
            recipe(3, "pasta salad", "pasta, cheese", "mix it"),
            recipe(5, "bread", "flour", "knead"),
        ];
        let terms = tokenize("pasta with cheese");

        let first = rank(&candidates, &terms, 5);
        let second = rank(&candidates, &terms, 5);
        let ids: Vec<i64> = first.iter().map(|h| h.recipe.id).collect();
        assert_eq!(ids, vec![3, 7]);
        assert_eq!(
            ids,
            second.iter().map(|h| h.recipe.id).collect::<Vec<_>>()
        );
        assert!(first.iter().all(|h| (h.distance - NEUTRAL_DISTANCE).abs() < f64::EPSILON));
    }

    #[test]
    fn rank_caps_results() {
        let candidates: Vec<Recipe> = (1..=10)
            .map(|i| recipe(i, "pasta dish", "pasta", "cook pasta"))
            .collect();
        let hits = rank(&candidates, &tokenize("pasta"), 5);
        assert_eq!(hits.len(), 5);
    }

    #[test]
    fn zero_score_candidates_are_dropped() {
        let candidates = vec![recipe(1, "bread", "flour", "knead")];
        let hits = rank(&candidates, &tokenize("sushi"), 5);
        assert!(hits.is_empty());
    }
}
