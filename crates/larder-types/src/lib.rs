//! Foundation types for the larder recipe catalog.
//!
//! This crate provides the identifiers and plain records shared by every other
//! larder crate. It holds no state and enforces no relational rules; those
//! live in `larder-store`.
//!
//! # Key Types
//!
//! - [`CategoryId`], [`IngredientId`], [`RecipeId`], [`RecipeIngredientId`]:
//!   time-ordered (UUID v7) identifiers, one newtype per entity kind
//! - [`Category`], [`Ingredient`], [`Recipe`], [`RecipeIngredient`]: entity records
//! - [`RecipeDraft`], [`IngredientLine`]: caller payloads for recipe mutations
//! - [`EntityKind`]: discriminant used in errors and change events

pub mod draft;
pub mod entity;
pub mod error;
pub mod id;
pub mod name;

pub use draft::{IngredientLine, RecipeDraft};
pub use entity::{Category, EntityKind, Ingredient, Recipe, RecipeIngredient};
pub use error::TypeError;
pub use id::{CategoryId, IngredientId, RecipeId, RecipeIngredientId};
pub use name::{contains_ignore_case, normalize_name};
