use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::id::{CategoryId, IngredientId, RecipeId, RecipeIngredientId};

/// The four kinds of record held by the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Category,
    Ingredient,
    Recipe,
    RecipeIngredient,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Category => "category",
            Self::Ingredient => "ingredient",
            Self::Recipe => "recipe",
            Self::RecipeIngredient => "recipe ingredient",
        };
        f.write_str(label)
    }
}

/// A named grouping of recipes.
///
/// A category does not store its recipes. The back-reference is derived by
/// scanning recipes whose `category` points here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Unique, trimmed, non-empty.
    pub name: String,
}

/// An ingredient that recipe lines may reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    /// Unique, trimmed, non-empty.
    pub name: String,
}

/// One ingredient line of a recipe: the association between a recipe and an
/// ingredient, carrying a free-text quantity.
///
/// Lines have no lifecycle of their own. They are created and destroyed only
/// as part of a recipe mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: RecipeIngredientId,
    /// The owning recipe. Never dangling while the line exists.
    pub recipe: RecipeId,
    /// `None` once the referenced ingredient has been deleted.
    pub ingredient: Option<IngredientId>,
    /// Free text such as `"2 cups"`; may be empty.
    pub quantity: String,
}

impl RecipeIngredient {
    /// Returns `true` if the line no longer names an ingredient.
    pub fn is_unnamed(&self) -> bool {
        self.ingredient.is_none()
    }
}

/// A recipe record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    /// Unique, trimmed, non-empty.
    pub name: String,
    pub summary: String,
    /// Number of servings, at least 1.
    pub serving: u32,
    /// Preparation time in minutes, at least 1.
    pub time: u32,
    pub instructions: String,
    pub image_data: Option<Bytes>,
    pub category: Option<CategoryId>,
    /// Owned ingredient lines in caller-controlled order.
    pub ingredients: Vec<RecipeIngredientId>,
}

impl Recipe {
    /// A recipe is complete once it has instructions.
    pub fn is_complete(&self) -> bool {
        !self.instructions.trim().is_empty()
    }

    /// Returns `true` if the recipe carries an image blob.
    pub fn has_image(&self) -> bool {
        self.image_data.as_ref().is_some_and(|b| !b.is_empty())
    }

    /// Position of a line within the ingredient list.
    pub fn line_position(&self, line: RecipeIngredientId) -> Option<usize> {
        self.ingredients.iter().position(|l| *l == line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> Recipe {
        Recipe {
            id: RecipeId::new(),
            name: "Bread".into(),
            summary: String::new(),
            serving: 2,
            time: 90,
            instructions: "  ".into(),
            image_data: None,
            category: None,
            ingredients: vec![],
        }
    }

    #[test]
    fn whitespace_instructions_are_incomplete() {
        let mut r = recipe();
        assert!(!r.is_complete());
        r.instructions = "Knead.".into();
        assert!(r.is_complete());
    }

    #[test]
    fn empty_image_is_no_image() {
        let mut r = recipe();
        assert!(!r.has_image());
        r.image_data = Some(Bytes::new());
        assert!(!r.has_image());
        r.image_data = Some(Bytes::from_static(b"\x89PNG"));
        assert!(r.has_image());
    }

    #[test]
    fn line_position_follows_list_order() {
        let mut r = recipe();
        let a = RecipeIngredientId::new();
        let b = RecipeIngredientId::new();
        r.ingredients = vec![a, b];
        assert_eq!(r.line_position(b), Some(1));
        assert_eq!(r.line_position(RecipeIngredientId::new()), None);
    }

    #[test]
    fn entity_kind_display() {
        assert_eq!(EntityKind::RecipeIngredient.to_string(), "recipe ingredient");
        assert_eq!(EntityKind::Category.to_string(), "category");
    }
}
