//! Query layer for the larder recipe catalog.
//!
//! Every function here takes a [`CatalogRead`](larder_store::CatalogRead)
//! view, recomputes its answer from the current tables, and returns owned
//! copies. Nothing is cached and nothing is mutated.
//!
//! # Key Types
//!
//! - [`SearchFilter`]: case-insensitive substring filter; empty matches all
//! - [`RecipeSort`]: the five recipe orderings
//! - [`RecipeDetail`]: one recipe with its category and lines resolved
//! - [`CategorySection`]: a category paired with its recipes

pub mod error;
pub mod filter;
pub mod query;
pub mod sort;
pub mod view;

pub use error::{QueryError, QueryResult};
pub use filter::SearchFilter;
pub use query::{
    category_sections, list_categories, list_ingredients, list_recipes, recipe_detail,
    recipes_in_category, recipes_using_ingredient, uncategorized_recipes, RecipeQuery,
};
pub use sort::RecipeSort;
pub use view::{CategorySection, RecipeDetail, ResolvedLine};
