//! Resolved, read-only views handed to presentation code.

use larder_types::{Category, Ingredient, Recipe, RecipeIngredientId};
use serde::Serialize;

/// One ingredient line with its ingredient record looked up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedLine {
    pub id: RecipeIngredientId,
    /// `None` for an unnamed line whose ingredient was deleted.
    pub ingredient: Option<Ingredient>,
    pub quantity: String,
}

impl ResolvedLine {
    /// Display name of the line's ingredient, if it still has one.
    pub fn ingredient_name(&self) -> Option<&str> {
        self.ingredient.as_ref().map(|i| i.name.as_str())
    }
}

/// A recipe with its category and ingredient lines resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub category: Option<Category>,
    /// Lines in the recipe's own order.
    pub lines: Vec<ResolvedLine>,
}

impl RecipeDetail {
    /// Lines that no longer name an ingredient.
    pub fn unnamed_lines(&self) -> impl Iterator<Item = &ResolvedLine> {
        self.lines.iter().filter(|l| l.ingredient.is_none())
    }
}

/// A category together with the recipes filed under it, in name order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategorySection {
    pub category: Category,
    pub recipes: Vec<Recipe>,
}

impl CategorySection {
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
