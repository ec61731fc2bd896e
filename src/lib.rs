pub mod config;
pub mod error;

// Ingredient matching core
pub mod maintainer;
pub mod matcher;

// Recipe store integration
pub mod store;

// HTTP surface
pub mod api;

// Command-line interface
pub mod cli;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
pub use maintainer::{BootstrapReport, IndexMaintainer, Readiness, RecipeEvent};
pub use matcher::{normalize, IngredientIndex, IngredientMatch, MatchMode, MatchResult, RecipeRecord};
