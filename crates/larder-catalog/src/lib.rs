//! Mutation API for the larder recipe catalog.
//!
//! [`Catalog`] is the single entry point for applications: it validates
//! input, applies each change atomically with its delete propagation,
//! journals it, and notifies subscribers. Reads run against a consistent
//! snapshot through the query layer.

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod validation;

pub use catalog::{Catalog, CatalogStats};
pub use config::{Bounds, CatalogConfig, Limits};
pub use error::{CatalogError, CatalogResult};
pub use events::{ChangeEvent, ChangeFilter, ChangeStream};

// Re-export the types callers need to drive the catalog.
pub use larder_query::{
    CategorySection, RecipeDetail, RecipeQuery, RecipeSort, ResolvedLine, SearchFilter,
};
pub use larder_store::{
    CatalogRead, CatalogState, JournalConfig, MutationAction, OrphanLines, Propagation, SyncMode,
};
pub use larder_types::{
    Category, CategoryId, EntityKind, Ingredient, IngredientId, IngredientLine, Recipe,
    RecipeDraft, RecipeId, RecipeIngredient, RecipeIngredientId,
};
