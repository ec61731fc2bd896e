use crate::matcher::index::{IndexSnapshot, IngredientIndex, RecipeId};
use crate::matcher::normalize::{normalize, Token};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Selection policy for fridge search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Any recipe sharing at least one ingredient with the query
    #[default]
    Loose,
    /// Only recipes whose whole ingredient list is covered by the query
    Strict,
}

impl MatchMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            MatchMode::Strict
        } else {
            MatchMode::Loose
        }
    }
}

/// A scored candidate recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub recipe_id: RecipeId,
    pub matched_tokens: BTreeSet<Token>,
    pub match_count: usize,
    pub ingredient_count: usize,
}

/// Score and rank recipes against a set of query tokens.
///
/// Candidates come only from the query tokens' buckets, so the cost follows
/// query size and bucket sizes rather than corpus size. Results are ordered by
/// `match_count` descending, then `recipe_id` ascending, and never truncated.
pub fn search(snapshot: &IndexSnapshot, query: &BTreeSet<Token>, mode: MatchMode) -> Vec<MatchResult> {
    if query.is_empty() {
        return Vec::new();
    }

    let candidates: BTreeSet<RecipeId> = query
        .iter()
        .filter_map(|token| snapshot.bucket(token.as_str()))
        .flat_map(|bucket| bucket.iter().copied())
        .collect();

    let mut results: Vec<MatchResult> = candidates
        .into_iter()
        .filter_map(|recipe_id| {
            let entry = snapshot.entry(recipe_id)?;
            let matched_tokens: BTreeSet<Token> = query
                .iter()
                .filter(|token| entry.ingredient_tokens.contains(*token))
                .cloned()
                .collect();
            let match_count = matched_tokens.len();

            let keep = match mode {
                MatchMode::Loose => match_count >= 1,
                MatchMode::Strict => {
                    entry.ingredient_count > 0 && match_count == entry.ingredient_count
                }
            };

            keep.then(|| MatchResult {
                recipe_id,
                matched_tokens,
                match_count,
                ingredient_count: entry.ingredient_count,
            })
        })
        .collect();

    rank_results(&mut results);
    results
}

fn rank_results(results: &mut [MatchResult]) {
    results.sort_unstable_by(|a, b| {
        b.match_count
            .cmp(&a.match_count)
            .then_with(|| a.recipe_id.cmp(&b.recipe_id))
    });
}

/// A user query: normalized tokens plus the spelling the user typed for each.
#[derive(Debug, Clone, Default)]
pub struct FridgeQuery {
    tokens: BTreeSet<Token>,
    // first spelling per token, in query order
    spellings: Vec<(Token, String)>,
}

impl FridgeQuery {
    pub fn parse<I, S>(raw_ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut query = FridgeQuery::default();

        for raw in raw_ingredients {
            let raw = raw.as_ref();
            let token = normalize(raw);
            if token.is_empty() || query.tokens.contains(&token) {
                continue;
            }
            query.tokens.insert(token.clone());
            query.spellings.push((token, raw.trim().to_string()));
        }

        query
    }

    pub fn tokens(&self) -> &BTreeSet<Token> {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Query spellings whose tokens appear in `matched`, in query order.
    fn spellings_for(&self, matched: &BTreeSet<Token>) -> Vec<String> {
        self.spellings
            .iter()
            .filter(|(token, _)| matched.contains(token))
            .map(|(_, spelling)| spelling.clone())
            .collect()
    }
}

/// Match result expressed in the caller's own ingredient spellings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientMatch {
    pub recipe_id: RecipeId,
    pub matched_ingredient_names: Vec<String>,
    pub match_count: usize,
    pub ingredient_count: usize,
}

/// Run a parsed fridge query against a snapshot.
pub fn search_query(snapshot: &IndexSnapshot, query: &FridgeQuery, mode: MatchMode) -> Vec<IngredientMatch> {
    search(snapshot, query.tokens(), mode)
        .into_iter()
        .map(|result| IngredientMatch {
            recipe_id: result.recipe_id,
            matched_ingredient_names: query.spellings_for(&result.matched_tokens),
            match_count: result.match_count,
            ingredient_count: result.ingredient_count,
        })
        .collect()
}

impl IngredientIndex {
    /// Search by normalized tokens against the current snapshot.
    pub fn search(&self, query: &BTreeSet<Token>, mode: MatchMode) -> Vec<MatchResult> {
        search(&self.snapshot(), query, mode)
    }

    /// Search by raw ingredient names as typed by a user.
    pub fn search_ingredients<I, S>(&self, raw_ingredients: I, mode: MatchMode) -> Vec<IngredientMatch>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let query = FridgeQuery::parse(raw_ingredients);
        search_query(&self.snapshot(), &query, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::normalize::normalize_all;

    fn scenario_index() -> IngredientIndex {
        let index = IngredientIndex::new();
        index.upsert(1, ["tomate", "oeuf", "fromage"]);
        index.upsert(2, ["tomate", "oeuf"]);
        index.upsert(3, ["poulet"]);
        index
    }

    fn recipe_ids(results: &[MatchResult]) -> Vec<RecipeId> {
        results.iter().map(|r| r.recipe_id).collect()
    }

    #[test]
    fn test_loose_mode_ranks_by_count_then_id() {
        let index = scenario_index();
        let results = index.search(&normalize_all(["tomate", "oeuf"]), MatchMode::Loose);

        assert_eq!(recipe_ids(&results), vec![1, 2]);
        assert!(results.iter().all(|r| r.match_count == 2));
    }

    #[test]
    fn test_strict_mode_requires_full_coverage() {
        let index = scenario_index();
        let results = index.search(&normalize_all(["tomate", "oeuf"]), MatchMode::Strict);

        assert_eq!(recipe_ids(&results), vec![2]);
        assert_eq!(results[0].match_count, results[0].ingredient_count);
    }

    #[test]
    fn test_strict_mode_allows_extra_query_ingredients() {
        let index = scenario_index();
        let query = normalize_all(["tomate", "oeuf", "fromage", "poulet", "sel"]);
        let results = index.search(&query, MatchMode::Strict);

        assert_eq!(recipe_ids(&results), vec![1, 2, 3]);
        assert_eq!(results[0].match_count, 3);
    }

    #[test]
    fn test_higher_match_count_ranks_first() {
        let index = scenario_index();
        index.upsert(0, ["fromage"]);
        let query = normalize_all(["fromage", "tomate", "oeuf"]);
        let results = index.search(&query, MatchMode::Loose);

        assert_eq!(recipe_ids(&results), vec![1, 2, 0]);
        assert_eq!(results[0].match_count, 3);
        assert_eq!(results[2].match_count, 1);
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let index = scenario_index();
        assert!(index.search(&BTreeSet::new(), MatchMode::Loose).is_empty());
        assert!(index
            .search_ingredients(["  ", ""], MatchMode::Strict)
            .is_empty());
    }

    #[test]
    fn test_unknown_tokens_are_ignored() {
        let index = scenario_index();
        let results = index.search(&normalize_all(["poulet", "licorne"]), MatchMode::Loose);

        assert_eq!(recipe_ids(&results), vec![3]);
        assert_eq!(results[0].matched_tokens, normalize_all(["poulet"]));
    }

    #[test]
    fn test_recipe_without_ingredients_never_matches() {
        let index = IngredientIndex::new();
        index.upsert(9, Vec::<String>::new());

        let query = normalize_all(["tomate"]);
        assert!(index.search(&query, MatchMode::Loose).is_empty());
        assert!(index.search(&query, MatchMode::Strict).is_empty());
    }

    #[test]
    fn test_search_ingredients_keeps_user_spelling() {
        let index = scenario_index();
        let results = index.search_ingredients(["Œuf", " Tomate ", "OEUF", "tomate"], MatchMode::Loose);

        // "Œuf" does not fold to "oeuf"; ligatures are not diacritics
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].recipe_id, 1);
        assert_eq!(results[0].matched_ingredient_names, vec!["Tomate", "OEUF"]);
        assert_eq!(results[0].match_count, 2);
        assert_eq!(results[0].ingredient_count, 3);
    }

    #[test]
    fn test_fridge_query_deduplicates() {
        let query = FridgeQuery::parse(["Tomate", "tomate", "tómate", "", "oeuf"]);
        assert_eq!(query.len(), 2);
        assert!(!query.is_empty());
    }

    #[test]
    fn test_match_mode_from_strict() {
        assert_eq!(MatchMode::from_strict(true), MatchMode::Strict);
        assert_eq!(MatchMode::from_strict(false), MatchMode::Loose);
        assert_eq!(MatchMode::default(), MatchMode::Loose);
    }
}
