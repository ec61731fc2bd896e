use serde::Deserialize;

/// Recipe as returned by `GET /recipes` and `GET /recipes/:id`.
///
/// Only the fields the index needs are decoded; the store sends many more
/// (title, category, steps) which are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRecipe {
    pub id: i64,
    #[serde(default)]
    pub ingredients: Vec<StoreIngredient>,
}

/// Ingredient line of a stored recipe
#[derive(Debug, Clone, Deserialize)]
pub struct StoreIngredient {
    #[serde(alias = "name")]
    pub nom: String,
}

impl StoreRecipe {
    pub fn ingredient_names(self) -> Vec<String> {
        self.ingredients.into_iter().map(|i| i.nom).collect()
    }
}
