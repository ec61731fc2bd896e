// Ingredient availability matching: normalization, the inverted
// ingredient index, and the fridge search engine on top of it

pub mod engine;
pub mod index;
pub mod normalize;

// Re-exports
pub use engine::{search, search_query, FridgeQuery, IngredientMatch, MatchMode, MatchResult};
pub use index::{IndexSnapshot, IngredientIndex, RecipeEntry, RecipeId, RecipeRecord};
pub use normalize::{normalize, normalize_all, Token};
