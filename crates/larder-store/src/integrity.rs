//! Delete propagation and ingredient-line maintenance.
//!
//! Each delete path is total:
//!
//! | Deleted      | Effect on referrers                                      |
//! |--------------|----------------------------------------------------------|
//! | Category     | recipes pointing at it get `category = None` (nullify)   |
//! | Recipe       | its lines are removed (cascade); ingredients untouched   |
//! | Ingredient   | lines pointing at it get `ingredient = None` (nullify), optionally removed |
//!
//! All checks run before the first write, so a failing call leaves the
//! tables as they were.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use larder_types::{
    CategoryId, EntityKind, IngredientId, RecipeId, RecipeIngredient, RecipeIngredientId,
};

use crate::error::{StoreError, StoreResult};
use crate::state::CatalogState;

/// What to do with lines left unnamed by an ingredient delete.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrphanLines {
    /// Keep the lines with their quantity; only the reference is cleared.
    #[default]
    Keep,
    /// Clear the reference, then remove the lines from their recipes.
    Remove,
}

/// Side effects of a mutation on records other than its target.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Propagation {
    /// Recipes whose category reference was cleared.
    pub recipes_uncategorized: Vec<RecipeId>,
    /// Lines whose ingredient reference was cleared.
    pub lines_nullified: Vec<RecipeIngredientId>,
    /// Lines that were removed.
    pub lines_removed: Vec<RecipeIngredientId>,
}

impl Propagation {
    /// Returns `true` if nothing besides the target was touched.
    pub fn is_empty(&self) -> bool {
        self.recipes_uncategorized.is_empty()
            && self.lines_nullified.is_empty()
            && self.lines_removed.is_empty()
    }
}

impl CatalogState {
    // ---------------------------------------------------------------
    // Deletes
    // ---------------------------------------------------------------

    /// Delete a category, clearing the reference on every recipe in it.
    pub fn delete_category(&mut self, id: &CategoryId) -> StoreResult<Propagation> {
        self.require_category(id)?;

        let mut report = Propagation::default();
        for recipe in self.recipes.values_mut() {
            if recipe.category == Some(*id) {
                recipe.category = None;
                report.recipes_uncategorized.push(recipe.id);
            }
        }
        self.categories.remove(id);

        debug!(
            category = %id.short_id(),
            nullified = report.recipes_uncategorized.len(),
            "category deleted"
        );
        Ok(report)
    }

    /// Delete a recipe and every line it owns. Referenced ingredients stay.
    pub fn delete_recipe(&mut self, id: &RecipeId) -> StoreResult<Propagation> {
        let owned = self.require_recipe(id)?.ingredients.clone();

        let mut report = Propagation::default();
        for line in owned {
            if self.lines.remove(&line).is_some() {
                report.lines_removed.push(line);
            }
        }
        self.recipes.remove(id);

        debug!(
            recipe = %id.short_id(),
            cascaded = report.lines_removed.len(),
            "recipe deleted"
        );
        Ok(report)
    }

    /// Delete an ingredient, clearing it from every line that names it.
    ///
    /// With [`OrphanLines::Remove`] those lines are then removed from their
    /// recipes as well.
    pub fn delete_ingredient(
        &mut self,
        id: &IngredientId,
        orphans: OrphanLines,
    ) -> StoreResult<Propagation> {
        self.require_ingredient(id)?;

        let mut report = Propagation::default();
        for line in self.lines.values_mut() {
            if line.ingredient == Some(*id) {
                line.ingredient = None;
                report.lines_nullified.push(line.id);
            }
        }

        if orphans == OrphanLines::Remove && !report.lines_nullified.is_empty() {
            let doomed: BTreeSet<RecipeIngredientId> =
                report.lines_nullified.iter().copied().collect();
            for recipe in self.recipes.values_mut() {
                recipe.ingredients.retain(|l| !doomed.contains(l));
            }
            for line in &doomed {
                self.lines.remove(line);
            }
            report.lines_removed = report.lines_nullified.clone();
        }
        self.ingredients.remove(id);

        debug!(
            ingredient = %id.short_id(),
            nullified = report.lines_nullified.len(),
            removed = report.lines_removed.len(),
            "ingredient deleted"
        );
        Ok(report)
    }

    // ---------------------------------------------------------------
    // Line edits
    // ---------------------------------------------------------------

    /// Replace a recipe's entire ingredient list.
    ///
    /// The old lines are removed and `lines` become the new list, in order.
    pub fn replace_lines(
        &mut self,
        recipe: &RecipeId,
        lines: Vec<RecipeIngredient>,
    ) -> StoreResult<Propagation> {
        let old = self.require_recipe(recipe)?.ingredients.clone();
        self.check_new_lines(recipe, &lines)?;

        let mut report = Propagation::default();
        for line in &old {
            if self.lines.remove(line).is_some() {
                report.lines_removed.push(*line);
            }
        }
        let ids: Vec<RecipeIngredientId> = lines.iter().map(|l| l.id).collect();
        for line in lines {
            self.lines.insert(line.id, line);
        }
        if let Some(r) = self.recipes.get_mut(recipe) {
            r.ingredients = ids;
        }
        Ok(report)
    }

    /// Attach one line to its owning recipe at `position` (end when `None`).
    pub fn insert_line(
        &mut self,
        line: RecipeIngredient,
        position: Option<usize>,
    ) -> StoreResult<()> {
        let len = self.require_recipe(&line.recipe)?.ingredients.len();
        let index = position.unwrap_or(len);
        if index > len {
            return Err(StoreError::PositionOutOfRange { index, len });
        }
        self.check_new_lines(&line.recipe, std::slice::from_ref(&line))?;

        if let Some(r) = self.recipes.get_mut(&line.recipe) {
            r.ingredients.insert(index, line.id);
        }
        self.lines.insert(line.id, line);
        Ok(())
    }

    /// Re-point a line at another ingredient (or none) and set its quantity.
    pub fn update_line(
        &mut self,
        id: &RecipeIngredientId,
        ingredient: Option<IngredientId>,
        quantity: &str,
    ) -> StoreResult<()> {
        self.require_line(id)?;
        self.require_ingredient_ref(ingredient.as_ref())?;

        if let Some(line) = self.lines.get_mut(id) {
            line.ingredient = ingredient;
            line.quantity = quantity.to_string();
        }
        Ok(())
    }

    /// Remove a single line from its recipe.
    pub fn remove_line(&mut self, id: &RecipeIngredientId) -> StoreResult<RecipeId> {
        let owner = self.require_line(id)?.recipe;
        self.require_recipe(&owner)?;

        if let Some(r) = self.recipes.get_mut(&owner) {
            r.ingredients.retain(|l| l != id);
        }
        self.lines.remove(id);
        Ok(owner)
    }

    /// Move the line at `from` to index `to` within a recipe's list.
    pub fn move_line(&mut self, recipe: &RecipeId, from: usize, to: usize) -> StoreResult<()> {
        let len = self.require_recipe(recipe)?.ingredients.len();
        for index in [from, to] {
            if index >= len {
                return Err(StoreError::PositionOutOfRange { index, len });
            }
        }
        if let Some(r) = self.recipes.get_mut(recipe) {
            let line = r.ingredients.remove(from);
            r.ingredients.insert(to, line);
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Audit
    // ---------------------------------------------------------------

    /// Verify every relational invariant of the catalog.
    ///
    /// Returns the first violation found. A healthy store always passes.
    pub fn audit(&self) -> StoreResult<()> {
        unique_names(EntityKind::Category, self.categories.values().map(|c| &c.name))?;
        unique_names(EntityKind::Ingredient, self.ingredients.values().map(|i| &i.name))?;
        unique_names(EntityKind::Recipe, self.recipes.values().map(|r| &r.name))?;

        let mut listed = BTreeSet::new();
        for recipe in self.recipes.values() {
            if recipe.serving == 0 || recipe.time == 0 {
                return Err(violation(format!(
                    "recipe {} has serving {} and time {}, both must be at least 1",
                    recipe.id, recipe.serving, recipe.time
                )));
            }
            if let Some(category) = &recipe.category {
                if !self.categories.contains_key(category) {
                    return Err(violation(format!(
                        "recipe {} points at missing category {category}",
                        recipe.id
                    )));
                }
            }
            for line_id in &recipe.ingredients {
                let line = self.lines.get(line_id).ok_or_else(|| {
                    violation(format!("recipe {} lists missing line {line_id}", recipe.id))
                })?;
                if line.recipe != recipe.id {
                    return Err(violation(format!(
                        "line {line_id} is listed by {} but owned by {}",
                        recipe.id, line.recipe
                    )));
                }
                if !listed.insert(*line_id) {
                    return Err(violation(format!("line {line_id} is listed twice")));
                }
            }
        }

        for line in self.lines.values() {
            if !listed.contains(&line.id) {
                return Err(violation(format!(
                    "line {} is not listed by its owner {}",
                    line.id, line.recipe
                )));
            }
            if let Some(ingredient) = &line.ingredient {
                if !self.ingredients.contains_key(ingredient) {
                    return Err(violation(format!(
                        "line {} points at missing ingredient {ingredient}",
                        line.id
                    )));
                }
            }
        }
        Ok(())
    }
}

fn violation(msg: String) -> StoreError {
    StoreError::IntegrityViolation(msg)
}

fn unique_names<'a>(
    kind: EntityKind,
    names: impl Iterator<Item = &'a String>,
) -> StoreResult<()> {
    let mut seen = BTreeSet::new();
    for name in names {
        if name.trim().is_empty() || name.trim() != name.as_str() {
            return Err(violation(format!("{kind} name {name:?} is not normalized")));
        }
        if !seen.insert(name.as_str()) {
            return Err(violation(format!("{kind} name {name:?} is not unique")));
        }
    }
    Ok(())
}
