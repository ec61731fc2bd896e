use frigo::matcher::normalize_all;
use frigo::{normalize, IngredientIndex, MatchMode};

fn sample_index() -> IngredientIndex {
    let index = IngredientIndex::new();
    // A, B and C of the tomato/egg/cheese example
    index.upsert(1, ["tomate", "oeuf", "fromage"]);
    index.upsert(2, ["tomate", "oeuf"]);
    index.upsert(3, ["poulet"]);
    index
}

#[test]
fn test_loose_returns_both_egg_and_tomato_recipes() {
    let index = sample_index();

    let results = index.search(&normalize_all(["tomate", "oeuf"]), MatchMode::Loose);

    let summary: Vec<(i64, usize)> = results.iter().map(|r| (r.recipe_id, r.match_count)).collect();
    assert_eq!(summary, vec![(1, 2), (2, 2)]);
}

#[test]
fn test_strict_returns_only_fully_covered_recipe() {
    let index = sample_index();

    let results = index.search(&normalize_all(["tomate", "oeuf"]), MatchMode::Strict);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].recipe_id, 2);
    assert_eq!(results[0].match_count, 2);
}

#[test]
fn test_strict_is_empty_after_removing_covered_recipe() {
    let index = sample_index();

    assert!(index.remove(2));
    let results = index.search(&normalize_all(["tomate", "oeuf"]), MatchMode::Strict);

    assert!(results.is_empty());
}

#[test]
fn test_query_spelling_variants_match_same_recipes() {
    let index = sample_index();

    let plain = index.search_ingredients(["tomate", "oeuf"], MatchMode::Loose);
    let noisy = index.search_ingredients(["  TÓMATE ", "Oeuf", "oeuf"], MatchMode::Loose);

    let plain_ids: Vec<i64> = plain.iter().map(|r| r.recipe_id).collect();
    let noisy_ids: Vec<i64> = noisy.iter().map(|r| r.recipe_id).collect();
    assert_eq!(plain_ids, noisy_ids);
    assert_eq!(noisy[0].matched_ingredient_names, vec!["TÓMATE", "Oeuf"]);
}

#[test]
fn test_normalization_equivalence() {
    let expected = normalize("Tomate");
    for variant in [" tomate ", "TOMATE", "tómate"] {
        assert_eq!(normalize(variant), expected, "variant {variant:?}");
    }
}

#[test]
fn test_repeated_searches_are_deterministic() {
    let index = IngredientIndex::new();
    for id in (0..50).rev() {
        let mut ingredients = vec!["sel"];
        if id % 2 == 0 {
            ingredients.push("poivre");
        }
        if id % 3 == 0 {
            ingredients.push("huile");
        }
        index.upsert(id, ingredients);
    }

    let query = normalize_all(["sel", "poivre", "huile"]);
    let first = index.search(&query, MatchMode::Loose);
    for _ in 0..5 {
        assert_eq!(index.search(&query, MatchMode::Loose), first);
    }

    // Highest coverage first, ids ascending within equal counts
    assert_eq!(first[0].recipe_id, 0);
    assert_eq!(first[0].match_count, 3);
    assert!(first
        .windows(2)
        .all(|w| w[0].match_count > w[1].match_count
            || (w[0].match_count == w[1].match_count && w[0].recipe_id < w[1].recipe_id)));
    assert_eq!(first.len(), 50);
}

#[test]
fn test_updating_recipe_changes_results() {
    let index = sample_index();

    index.upsert(3, ["poulet", "tomate"]);
    let results = index.search(&normalize_all(["poulet", "tomate"]), MatchMode::Strict);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].recipe_id, 3);
    assert_eq!(results[0].match_count, 2);
}
