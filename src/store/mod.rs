// External recipe store boundary
// The index only ever sees recipe ids and ingredient names from here

pub mod client;
pub mod models;

use crate::matcher::{RecipeId, RecipeRecord};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::future::Future;

pub use client::HttpRecipeStore;

/// Enumerates the current recipe corpus for bootstrapping the index.
pub trait RecipeSource: Send + Sync {
    /// Ids of every recipe currently in the store
    fn recipe_ids(&self) -> impl Future<Output = Result<Vec<RecipeId>>> + Send;

    /// Ingredient names of one recipe
    fn recipe_ingredients(
        &self,
        recipe_id: RecipeId,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Recipe source backed by records already held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticRecipeSource {
    recipes: BTreeMap<RecipeId, Vec<String>>,
}

impl StaticRecipeSource {
    pub fn new<I>(records: I) -> Self
    where
        I: IntoIterator<Item = RecipeRecord>,
    {
        Self {
            recipes: records
                .into_iter()
                .map(|record| (record.recipe_id, record.ingredient_names))
                .collect(),
        }
    }
}

impl RecipeSource for StaticRecipeSource {
    async fn recipe_ids(&self) -> Result<Vec<RecipeId>> {
        Ok(self.recipes.keys().copied().collect())
    }

    async fn recipe_ingredients(&self, recipe_id: RecipeId) -> Result<Vec<String>> {
        self.recipes
            .get(&recipe_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Recipe {recipe_id} not found")))
    }
}
