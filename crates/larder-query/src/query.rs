//! Catalog queries.
//!
//! All functions are pure reads over a [`CatalogRead`] view and return owned
//! copies, so callers cannot reach back into the store through a result.

use larder_store::CatalogRead;
use larder_types::{Category, CategoryId, Ingredient, IngredientId, Recipe, RecipeId};
use serde::{Deserialize, Serialize};

use crate::filter::SearchFilter;
use crate::sort::RecipeSort;
use crate::view::{CategorySection, RecipeDetail, ResolvedLine};

/// Parameters of a recipe listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeQuery {
    pub filter: SearchFilter,
    pub sort: RecipeSort,
}

impl RecipeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, needle: impl Into<String>) -> Self {
        self.filter = SearchFilter::new(needle);
        self
    }

    pub fn sort(mut self, sort: RecipeSort) -> Self {
        self.sort = sort;
        self
    }
}

/// Categories matching `filter`, name ascending.
pub fn list_categories(catalog: &dyn CatalogRead, filter: &SearchFilter) -> Vec<Category> {
    let mut out: Vec<Category> = catalog
        .categories()
        .filter(|c| filter.matches_category(c))
        .cloned()
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    out
}

/// Ingredients matching `filter`, name ascending.
pub fn list_ingredients(catalog: &dyn CatalogRead, filter: &SearchFilter) -> Vec<Ingredient> {
    let mut out: Vec<Ingredient> = catalog
        .ingredients()
        .filter(|i| filter.matches_ingredient(i))
        .cloned()
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    out
}

/// Recipes whose name or summary matches, in the requested order.
pub fn list_recipes(catalog: &dyn CatalogRead, query: &RecipeQuery) -> Vec<Recipe> {
    let mut out: Vec<Recipe> = catalog
        .recipes()
        .filter(|r| query.filter.matches_recipe(r))
        .cloned()
        .collect();
    query.sort.apply(&mut out);
    out
}

/// Recipes filed under `category`, name ascending.
///
/// This is the derived back-reference of a category; nothing is stored on
/// the category itself.
pub fn recipes_in_category(catalog: &dyn CatalogRead, category: &CategoryId) -> Vec<Recipe> {
    collect_sorted(catalog, |r| r.category == Some(*category))
}

/// Recipes without a category, name ascending.
pub fn uncategorized_recipes(catalog: &dyn CatalogRead) -> Vec<Recipe> {
    collect_sorted(catalog, |r| r.category.is_none())
}

/// Recipes with at least one line naming `ingredient`, name ascending.
pub fn recipes_using_ingredient(catalog: &dyn CatalogRead, ingredient: &IngredientId) -> Vec<Recipe> {
    collect_sorted(catalog, |r| {
        r.ingredients.iter().any(|id| {
            catalog
                .line(id)
                .is_some_and(|l| l.ingredient == Some(*ingredient))
        })
    })
}

/// One recipe with its category and lines resolved.
pub fn recipe_detail(catalog: &dyn CatalogRead, id: &RecipeId) -> Option<RecipeDetail> {
    let recipe = catalog.recipe(id)?.clone();
    let category = recipe
        .category
        .as_ref()
        .and_then(|c| catalog.category(c))
        .cloned();
    let lines = catalog
        .lines_of(id)
        .into_iter()
        .map(|line| ResolvedLine {
            id: line.id,
            ingredient: line
                .ingredient
                .as_ref()
                .and_then(|i| catalog.ingredient(i))
                .cloned(),
            quantity: line.quantity.clone(),
        })
        .collect();
    Some(RecipeDetail {
        recipe,
        category,
        lines,
    })
}

/// Categories matching `filter`, each with its recipes.
pub fn category_sections(catalog: &dyn CatalogRead, filter: &SearchFilter) -> Vec<CategorySection> {
    list_categories(catalog, filter)
        .into_iter()
        .map(|category| {
            let recipes = recipes_in_category(catalog, &category.id);
            CategorySection { category, recipes }
        })
        .collect()
}

fn collect_sorted(catalog: &dyn CatalogRead, keep: impl Fn(&Recipe) -> bool) -> Vec<Recipe> {
    let mut out: Vec<Recipe> = catalog.recipes().filter(|r| keep(r)).cloned().collect();
    RecipeSort::Name.apply(&mut out);
    out
}
