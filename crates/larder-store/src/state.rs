use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use larder_types::{
    normalize_name, Category, CategoryId, EntityKind, Ingredient, IngredientId, Recipe,
    RecipeDraft, RecipeId, RecipeIngredient, RecipeIngredientId,
};

use crate::error::{StoreError, StoreResult};
use crate::traits::CatalogRead;

/// The four entity tables of the catalog.
///
/// `CatalogState` is a plain value: cloning it yields an independent copy.
/// Every mutating method checks its preconditions first and only then
/// touches the tables, so an `Err` return means nothing changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogState {
    pub(crate) categories: BTreeMap<CategoryId, Category>,
    pub(crate) ingredients: BTreeMap<IngredientId, Ingredient>,
    pub(crate) recipes: BTreeMap<RecipeId, Recipe>,
    pub(crate) lines: BTreeMap<RecipeIngredientId, RecipeIngredient>,
}

impl CatalogState {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if all four tables are empty.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.ingredients.is_empty()
            && self.recipes.is_empty()
            && self.lines.is_empty()
    }

    // ---------------------------------------------------------------
    // Name lookup
    // ---------------------------------------------------------------

    /// Find a category by exact (normalized) name.
    pub fn category_named(&self, name: &str) -> Option<&Category> {
        let name = normalize_name(name);
        self.categories.values().find(|c| c.name == name)
    }

    /// Find an ingredient by exact (normalized) name.
    pub fn ingredient_named(&self, name: &str) -> Option<&Ingredient> {
        let name = normalize_name(name);
        self.ingredients.values().find(|i| i.name == name)
    }

    /// Find a recipe by exact (normalized) name.
    pub fn recipe_named(&self, name: &str) -> Option<&Recipe> {
        let name = normalize_name(name);
        self.recipes.values().find(|r| r.name == name)
    }

    // ---------------------------------------------------------------
    // Existence checks
    // ---------------------------------------------------------------

    pub(crate) fn require_category(&self, id: &CategoryId) -> StoreResult<&Category> {
        self.categories
            .get(id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Category, id))
    }

    pub(crate) fn require_ingredient(&self, id: &IngredientId) -> StoreResult<&Ingredient> {
        self.ingredients
            .get(id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Ingredient, id))
    }

    pub(crate) fn require_recipe(&self, id: &RecipeId) -> StoreResult<&Recipe> {
        self.recipes
            .get(id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Recipe, id))
    }

    pub(crate) fn require_line(&self, id: &RecipeIngredientId) -> StoreResult<&RecipeIngredient> {
        self.lines
            .get(id)
            .ok_or_else(|| StoreError::not_found(EntityKind::RecipeIngredient, id))
    }

    /// Check an optional ingredient reference.
    pub(crate) fn require_ingredient_ref(&self, id: Option<&IngredientId>) -> StoreResult<()> {
        match id {
            Some(id) => self.require_ingredient(id).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Check an optional category reference.
    pub(crate) fn require_category_ref(&self, id: Option<&CategoryId>) -> StoreResult<()> {
        match id {
            Some(id) => self.require_category(id).map(|_| ()),
            None => Ok(()),
        }
    }

    // ---------------------------------------------------------------
    // Categories
    // ---------------------------------------------------------------

    /// Insert a new category. The name is normalized before storing.
    pub fn insert_category(&mut self, category: Category) -> StoreResult<()> {
        let name = normalize_name(&category.name);
        if self.categories.contains_key(&category.id) {
            return Err(StoreError::IntegrityViolation(format!(
                "category id {} reused",
                category.id
            )));
        }
        if self.category_named(&name).is_some() {
            return Err(StoreError::duplicate(EntityKind::Category, &name));
        }
        self.categories.insert(category.id, Category { name, ..category });
        Ok(())
    }

    /// Rename a category. Renaming to its own current name is a no-op.
    pub fn rename_category(&mut self, id: &CategoryId, name: &str) -> StoreResult<()> {
        let name = normalize_name(name);
        self.require_category(id)?;
        if let Some(other) = self.category_named(&name) {
            if other.id != *id {
                return Err(StoreError::duplicate(EntityKind::Category, &name));
            }
        }
        if let Some(category) = self.categories.get_mut(id) {
            category.name = name;
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Ingredients
    // ---------------------------------------------------------------

    /// Insert a new ingredient. The name is normalized before storing.
    pub fn insert_ingredient(&mut self, ingredient: Ingredient) -> StoreResult<()> {
        let name = normalize_name(&ingredient.name);
        if self.ingredients.contains_key(&ingredient.id) {
            return Err(StoreError::IntegrityViolation(format!(
                "ingredient id {} reused",
                ingredient.id
            )));
        }
        if self.ingredient_named(&name).is_some() {
            return Err(StoreError::duplicate(EntityKind::Ingredient, &name));
        }
        self.ingredients
            .insert(ingredient.id, Ingredient { name, ..ingredient });
        Ok(())
    }

    /// Rename an ingredient. Renaming to its own current name is a no-op.
    pub fn rename_ingredient(&mut self, id: &IngredientId, name: &str) -> StoreResult<()> {
        let name = normalize_name(name);
        self.require_ingredient(id)?;
        if let Some(other) = self.ingredient_named(&name) {
            if other.id != *id {
                return Err(StoreError::duplicate(EntityKind::Ingredient, &name));
            }
        }
        if let Some(ingredient) = self.ingredients.get_mut(id) {
            ingredient.name = name;
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Recipes
    // ---------------------------------------------------------------

    /// Insert a new recipe together with its owned lines.
    ///
    /// `recipe.ingredients` must list exactly the ids of `lines`, in order,
    /// and every line must name `recipe.id` as its owner.
    pub fn insert_recipe(&mut self, recipe: Recipe, lines: Vec<RecipeIngredient>) -> StoreResult<()> {
        let name = normalize_name(&recipe.name);
        if self.recipes.contains_key(&recipe.id) {
            return Err(StoreError::IntegrityViolation(format!(
                "recipe id {} reused",
                recipe.id
            )));
        }
        if self.recipe_named(&name).is_some() {
            return Err(StoreError::duplicate(EntityKind::Recipe, &name));
        }
        self.require_category_ref(recipe.category.as_ref())?;
        self.check_new_lines(&recipe.id, &lines)?;

        let listed: Vec<RecipeIngredientId> = lines.iter().map(|l| l.id).collect();
        if listed != recipe.ingredients {
            return Err(StoreError::IntegrityViolation(format!(
                "recipe {} lists lines that were not supplied",
                recipe.id
            )));
        }

        for line in lines {
            self.lines.insert(line.id, line);
        }
        self.recipes.insert(recipe.id, Recipe { name, ..recipe });
        Ok(())
    }

    /// Overwrite a recipe's fields (everything except its ingredient list).
    ///
    /// Re-pointing the category is a forward-reference change only: the new
    /// category must exist, the old one needs no bookkeeping.
    pub fn update_recipe(&mut self, id: &RecipeId, draft: &RecipeDraft) -> StoreResult<()> {
        let name = normalize_name(&draft.name);
        self.require_recipe(id)?;
        if let Some(other) = self.recipe_named(&name) {
            if other.id != *id {
                return Err(StoreError::duplicate(EntityKind::Recipe, &name));
            }
        }
        self.require_category_ref(draft.category.as_ref())?;

        if let Some(recipe) = self.recipes.get_mut(id) {
            recipe.name = name;
            recipe.summary = draft.summary.clone();
            recipe.serving = draft.serving;
            recipe.time = draft.time;
            recipe.instructions = draft.instructions.clone();
            recipe.image_data = draft.image_data.clone();
            recipe.category = draft.category;
        }
        Ok(())
    }

    /// Validate lines that are about to be attached to `owner`.
    pub(crate) fn check_new_lines(
        &self,
        owner: &RecipeId,
        lines: &[RecipeIngredient],
    ) -> StoreResult<()> {
        for (i, line) in lines.iter().enumerate() {
            if line.recipe != *owner {
                return Err(StoreError::IntegrityViolation(format!(
                    "line {} is owned by {}, not {owner}",
                    line.id, line.recipe
                )));
            }
            if self.lines.contains_key(&line.id) || lines[..i].iter().any(|l| l.id == line.id) {
                return Err(StoreError::IntegrityViolation(format!(
                    "line id {} reused",
                    line.id
                )));
            }
            self.require_ingredient_ref(line.ingredient.as_ref())?;
        }
        Ok(())
    }
}

impl CatalogRead for CatalogState {
    fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.get(id)
    }

    fn categories(&self) -> Box<dyn Iterator<Item = &Category> + '_> {
        Box::new(self.categories.values())
    }

    fn ingredient(&self, id: &IngredientId) -> Option<&Ingredient> {
        self.ingredients.get(id)
    }

    fn ingredients(&self) -> Box<dyn Iterator<Item = &Ingredient> + '_> {
        Box::new(self.ingredients.values())
    }

    fn recipe(&self, id: &RecipeId) -> Option<&Recipe> {
        self.recipes.get(id)
    }

    fn recipes(&self) -> Box<dyn Iterator<Item = &Recipe> + '_> {
        Box::new(self.recipes.values())
    }

    fn line(&self, id: &RecipeIngredientId) -> Option<&RecipeIngredient> {
        self.lines.get(id)
    }

    fn lines(&self) -> Box<dyn Iterator<Item = &RecipeIngredient> + '_> {
        Box::new(self.lines.values())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn category(name: &str) -> Category {
        Category {
            id: CategoryId::new(),
            name: name.into(),
        }
    }

    pub(crate) fn ingredient(name: &str) -> Ingredient {
        Ingredient {
            id: IngredientId::new(),
            name: name.into(),
        }
    }

    /// A recipe with the given lines `(ingredient, quantity)`.
    pub(crate) fn recipe_with(
        name: &str,
        category: Option<CategoryId>,
        lines: &[(Option<IngredientId>, &str)],
    ) -> (Recipe, Vec<RecipeIngredient>) {
        let id = RecipeId::new();
        let lines: Vec<RecipeIngredient> = lines
            .iter()
            .map(|(ingredient, quantity)| RecipeIngredient {
                id: RecipeIngredientId::new(),
                recipe: id,
                ingredient: *ingredient,
                quantity: quantity.to_string(),
            })
            .collect();
        let recipe = Recipe {
            id,
            name: name.into(),
            summary: String::new(),
            serving: 1,
            time: 5,
            instructions: "Cook.".into(),
            image_data: None,
            category,
            ingredients: lines.iter().map(|l| l.id).collect(),
        };
        (recipe, lines)
    }

    #[test]
    fn new_state_is_empty() {
        let state = CatalogState::new();
        assert!(state.is_empty());
        assert_eq!(state.recipe_count(), 0);
    }

    #[test]
    fn insert_category_trims_name() {
        let mut state = CatalogState::new();
        let c = category("  Italian ");
        let id = c.id;
        state.insert_category(c).unwrap();
        assert_eq!(state.category(&id).unwrap().name, "Italian");
        assert!(state.category_named("Italian").is_some());
    }

    #[test]
    fn duplicate_category_name_is_rejected() {
        let mut state = CatalogState::new();
        state.insert_category(category("Italian")).unwrap();
        let err = state.insert_category(category(" Italian")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::DuplicateName { kind: EntityKind::Category, .. }
        ));
        assert_eq!(state.category_count(), 1);
    }

    #[test]
    fn uniqueness_is_case_sensitive() {
        let mut state = CatalogState::new();
        state.insert_ingredient(ingredient("Flour")).unwrap();
        state.insert_ingredient(ingredient("flour")).unwrap();
        assert_eq!(state.ingredient_count(), 2);
    }

    #[test]
    fn rename_to_own_name_is_allowed() {
        let mut state = CatalogState::new();
        let c = category("Dessert");
        let id = c.id;
        state.insert_category(c).unwrap();
        state.rename_category(&id, " Dessert ").unwrap();
        assert_eq!(state.category(&id).unwrap().name, "Dessert");
    }

    #[test]
    fn rename_onto_other_name_is_rejected() {
        let mut state = CatalogState::new();
        let a = ingredient("Salt");
        let b = ingredient("Pepper");
        let b_id = b.id;
        state.insert_ingredient(a).unwrap();
        state.insert_ingredient(b).unwrap();
        let err = state.rename_ingredient(&b_id, "Salt").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName { .. }));
        assert_eq!(state.ingredient(&b_id).unwrap().name, "Pepper");
    }

    #[test]
    fn rename_missing_is_not_found() {
        let mut state = CatalogState::new();
        let err = state.rename_category(&CategoryId::new(), "X").unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound { kind: EntityKind::Category, .. }
        ));
    }

    #[test]
    fn insert_recipe_with_lines() {
        let mut state = CatalogState::new();
        let flour = ingredient("Flour");
        let flour_id = flour.id;
        state.insert_ingredient(flour).unwrap();
        let (recipe, lines) = recipe_with("Bread", None, &[(Some(flour_id), "2 cups")]);
        let rid = recipe.id;
        state.insert_recipe(recipe, lines).unwrap();

        let lines = state.lines_of(&rid);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, "2 cups");
        assert_eq!(lines[0].ingredient, Some(flour_id));
    }

    #[test]
    fn insert_recipe_with_unknown_ingredient_changes_nothing() {
        let mut state = CatalogState::new();
        let (recipe, lines) = recipe_with("Bread", None, &[(Some(IngredientId::new()), "1")]);
        let err = state.insert_recipe(recipe, lines).unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound { kind: EntityKind::Ingredient, .. }
        ));
        assert!(state.is_empty());
    }

    #[test]
    fn insert_recipe_with_unknown_category_is_rejected() {
        let mut state = CatalogState::new();
        let (recipe, lines) = recipe_with("Pizza", Some(CategoryId::new()), &[]);
        let err = state.insert_recipe(recipe, lines).unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound { kind: EntityKind::Category, .. }
        ));
    }

    #[test]
    fn insert_recipe_rejects_foreign_lines() {
        let mut state = CatalogState::new();
        let (recipe, mut lines) = recipe_with("Stew", None, &[(None, "1")]);
        lines[0].recipe = RecipeId::new();
        let err = state.insert_recipe(recipe, lines).unwrap_err();
        assert!(matches!(err, StoreError::IntegrityViolation(_)));
    }

    #[test]
    fn update_recipe_repoints_category() {
        let mut state = CatalogState::new();
        let italian = category("Italian");
        let quick = category("Quick");
        let (italian_id, quick_id) = (italian.id, quick.id);
        state.insert_category(italian).unwrap();
        state.insert_category(quick).unwrap();
        let (recipe, lines) = recipe_with("Pizza", Some(italian_id), &[]);
        let rid = recipe.id;
        state.insert_recipe(recipe, lines).unwrap();

        let draft = RecipeDraft::new("Pizza")
            .with_serving(3)
            .with_category(Some(quick_id));
        state.update_recipe(&rid, &draft).unwrap();
        let r = state.recipe(&rid).unwrap();
        assert_eq!(r.category, Some(quick_id));
        assert_eq!(r.serving, 3);
    }

    #[test]
    fn update_recipe_to_missing_category_changes_nothing() {
        let mut state = CatalogState::new();
        let (recipe, lines) = recipe_with("Pizza", None, &[]);
        let rid = recipe.id;
        state.insert_recipe(recipe, lines).unwrap();
        let before = state.clone();

        let draft = RecipeDraft::new("Calzone").with_category(Some(CategoryId::new()));
        assert!(state.update_recipe(&rid, &draft).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn lines_of_unknown_recipe_is_empty() {
        let state = CatalogState::new();
        assert!(state.lines_of(&RecipeId::new()).is_empty());
    }
}
