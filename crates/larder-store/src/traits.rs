use larder_types::{
    Category, CategoryId, Ingredient, IngredientId, Recipe, RecipeId, RecipeIngredient,
    RecipeIngredientId,
};

/// Read-only view of the catalog tables.
///
/// The query layer is written against this trait so it never sees a mutable
/// handle. Iteration order of the `*s()` methods is id order; callers sort.
pub trait CatalogRead {
    fn category(&self, id: &CategoryId) -> Option<&Category>;

    fn categories(&self) -> Box<dyn Iterator<Item = &Category> + '_>;

    fn ingredient(&self, id: &IngredientId) -> Option<&Ingredient>;

    fn ingredients(&self) -> Box<dyn Iterator<Item = &Ingredient> + '_>;

    fn recipe(&self, id: &RecipeId) -> Option<&Recipe>;

    fn recipes(&self) -> Box<dyn Iterator<Item = &Recipe> + '_>;

    fn line(&self, id: &RecipeIngredientId) -> Option<&RecipeIngredient>;

    fn lines(&self) -> Box<dyn Iterator<Item = &RecipeIngredient> + '_>;

    /// The lines of a recipe in list order. Empty if the recipe is unknown.
    fn lines_of(&self, recipe: &RecipeId) -> Vec<&RecipeIngredient> {
        self.recipe(recipe)
            .map(|r| r.ingredients.iter().filter_map(|id| self.line(id)).collect())
            .unwrap_or_default()
    }
}
