use crate::matcher::IngredientMatch;
use serde::{Deserialize, Serialize};

/// Fridge search request body
#[derive(Debug, Clone, Deserialize)]
pub struct FridgeSearchRequest {
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub strict: bool,
}

/// One ranked recipe in a fridge search response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FridgeMatch {
    pub recipe_id: i64,
    pub matched_ingredients: Vec<String>,
    pub match_count: usize,
    pub ingredient_count: usize,
}

impl From<IngredientMatch> for FridgeMatch {
    fn from(m: IngredientMatch) -> Self {
        Self {
            recipe_id: m.recipe_id,
            matched_ingredients: m.matched_ingredient_names,
            match_count: m.match_count,
            ingredient_count: m.ingredient_count,
        }
    }
}

/// Index statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub recipes: usize,
    pub tokens: usize,
}

/// Acknowledgement for a queued recipe event
#[derive(Debug, Clone, Serialize)]
pub struct EventAccepted {
    pub recipe_id: i64,
    pub queued: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub degraded: bool,
    pub indexed_recipes: usize,
    pub omitted_recipes: usize,
}
