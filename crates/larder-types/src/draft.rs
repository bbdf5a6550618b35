//! Caller payloads for recipe mutations.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::entity::Recipe;
use crate::id::{CategoryId, IngredientId};

/// Field values for creating or editing a recipe.
///
/// The ingredient list travels separately as a `Vec<IngredientLine>` so that
/// field edits and list replacement can be issued independently.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub name: String,
    pub summary: String,
    pub serving: u32,
    pub time: u32,
    pub instructions: String,
    pub image_data: Option<Bytes>,
    pub category: Option<CategoryId>,
}

impl RecipeDraft {
    /// A draft with the given name and default values for everything else.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_serving(mut self, serving: u32) -> Self {
        self.serving = serving;
        self
    }

    pub fn with_time(mut self, minutes: u32) -> Self {
        self.time = minutes;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_category(mut self, category: Option<CategoryId>) -> Self {
        self.category = category;
        self
    }

    pub fn with_image(mut self, image: impl Into<Bytes>) -> Self {
        self.image_data = Some(image.into());
        self
    }
}

impl Default for RecipeDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            summary: String::new(),
            serving: 1,
            time: 5,
            instructions: String::new(),
            image_data: None,
            category: None,
        }
    }
}

/// The editable fields of an existing recipe, for a read-modify-write edit.
impl From<&Recipe> for RecipeDraft {
    fn from(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name.clone(),
            summary: recipe.summary.clone(),
            serving: recipe.serving,
            time: recipe.time,
            instructions: recipe.instructions.clone(),
            image_data: recipe.image_data.clone(),
            category: recipe.category,
        }
    }
}

/// One requested ingredient line.
///
/// `ingredient` may be `None` to keep an unnamed line (one whose ingredient
/// was deleted) when a recipe's list is saved back unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub ingredient: Option<IngredientId>,
    pub quantity: String,
}

impl IngredientLine {
    pub fn new(ingredient: IngredientId, quantity: impl Into<String>) -> Self {
        Self {
            ingredient: Some(ingredient),
            quantity: quantity.into(),
        }
    }

    /// A line without an ingredient reference.
    pub fn unnamed(quantity: impl Into<String>) -> Self {
        Self {
            ingredient: None,
            quantity: quantity.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_new_recipe_form() {
        let d = RecipeDraft::new("Soup");
        assert_eq!(d.name, "Soup");
        assert_eq!(d.serving, 1);
        assert_eq!(d.time, 5);
        assert!(d.summary.is_empty());
        assert!(d.category.is_none());
        assert!(d.image_data.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let cat = CategoryId::new();
        let d = RecipeDraft::new("Pizza")
            .with_serving(4)
            .with_time(30)
            .with_summary("Thin crust")
            .with_instructions("Bake hot.")
            .with_category(Some(cat))
            .with_image(&b"jpeg"[..]);
        assert_eq!(d.serving, 4);
        assert_eq!(d.time, 30);
        assert_eq!(d.category, Some(cat));
        assert_eq!(d.image_data.as_deref(), Some(&b"jpeg"[..]));
    }

    #[test]
    fn draft_from_recipe_copies_fields() {
        let recipe = Recipe {
            id: crate::id::RecipeId::new(),
            name: "Stew".into(),
            summary: "Slow".into(),
            serving: 6,
            time: 180,
            instructions: "Simmer.".into(),
            image_data: None,
            category: Some(CategoryId::new()),
            ingredients: vec![],
        };
        let d = RecipeDraft::from(&recipe);
        assert_eq!(d.name, "Stew");
        assert_eq!(d.time, 180);
        assert_eq!(d.category, recipe.category);
    }

    #[test]
    fn unnamed_line_has_no_ingredient() {
        let line = IngredientLine::unnamed("a pinch");
        assert!(line.ingredient.is_none());
        assert_eq!(line.quantity, "a pinch");
    }
}
