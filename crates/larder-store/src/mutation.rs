use serde::{Deserialize, Serialize};
use tracing::warn;

use larder_types::{
    Category, CategoryId, EntityKind, Ingredient, IngredientId, Recipe, RecipeDraft, RecipeId,
    RecipeIngredient, RecipeIngredientId,
};

use crate::error::StoreResult;
use crate::integrity::{OrphanLines, Propagation};
use crate::journal::JournalRecord;
use crate::state::CatalogState;

/// A single, fully resolved change to the catalog.
///
/// Every id a mutation introduces is chosen before the mutation is built, so
/// replaying the same sequence of mutations on an empty state reproduces the
/// same catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    CreateCategory(Category),
    RenameCategory {
        id: CategoryId,
        name: String,
    },
    DeleteCategory {
        id: CategoryId,
    },
    CreateIngredient(Ingredient),
    RenameIngredient {
        id: IngredientId,
        name: String,
    },
    DeleteIngredient {
        id: IngredientId,
        orphans: OrphanLines,
    },
    CreateRecipe {
        recipe: Recipe,
        lines: Vec<RecipeIngredient>,
    },
    UpdateRecipe {
        id: RecipeId,
        draft: RecipeDraft,
    },
    DeleteRecipe {
        id: RecipeId,
    },
    SetRecipeIngredients {
        recipe: RecipeId,
        lines: Vec<RecipeIngredient>,
    },
    AddRecipeIngredient {
        line: RecipeIngredient,
        position: Option<usize>,
    },
    UpdateRecipeIngredient {
        id: RecipeIngredientId,
        ingredient: Option<IngredientId>,
        quantity: String,
    },
    RemoveRecipeIngredient {
        id: RecipeIngredientId,
    },
    MoveRecipeIngredient {
        recipe: RecipeId,
        from: usize,
        to: usize,
    },
}

/// Coarse classification of a mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationAction {
    Created,
    Updated,
    Deleted,
}

impl Mutation {
    /// The kind of record this mutation targets.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::CreateCategory(_) | Self::RenameCategory { .. } | Self::DeleteCategory { .. } => {
                EntityKind::Category
            }
            Self::CreateIngredient(_)
            | Self::RenameIngredient { .. }
            | Self::DeleteIngredient { .. } => EntityKind::Ingredient,
            Self::CreateRecipe { .. }
            | Self::UpdateRecipe { .. }
            | Self::DeleteRecipe { .. }
            | Self::SetRecipeIngredients { .. }
            | Self::MoveRecipeIngredient { .. } => EntityKind::Recipe,
            Self::AddRecipeIngredient { .. }
            | Self::UpdateRecipeIngredient { .. }
            | Self::RemoveRecipeIngredient { .. } => EntityKind::RecipeIngredient,
        }
    }

    pub fn action(&self) -> MutationAction {
        match self {
            Self::CreateCategory(_)
            | Self::CreateIngredient(_)
            | Self::CreateRecipe { .. }
            | Self::AddRecipeIngredient { .. } => MutationAction::Created,
            Self::DeleteCategory { .. }
            | Self::DeleteIngredient { .. }
            | Self::DeleteRecipe { .. }
            | Self::RemoveRecipeIngredient { .. } => MutationAction::Deleted,
            Self::RenameCategory { .. }
            | Self::RenameIngredient { .. }
            | Self::UpdateRecipe { .. }
            | Self::SetRecipeIngredients { .. }
            | Self::UpdateRecipeIngredient { .. }
            | Self::MoveRecipeIngredient { .. } => MutationAction::Updated,
        }
    }

    /// The id of the targeted record, rendered as a string.
    pub fn target_id(&self) -> String {
        match self {
            Self::CreateCategory(c) => c.id.to_string(),
            Self::RenameCategory { id, .. } | Self::DeleteCategory { id } => id.to_string(),
            Self::CreateIngredient(i) => i.id.to_string(),
            Self::RenameIngredient { id, .. } | Self::DeleteIngredient { id, .. } => id.to_string(),
            Self::CreateRecipe { recipe, .. } => recipe.id.to_string(),
            Self::UpdateRecipe { id, .. } | Self::DeleteRecipe { id } => id.to_string(),
            Self::SetRecipeIngredients { recipe, .. } | Self::MoveRecipeIngredient { recipe, .. } => {
                recipe.to_string()
            }
            Self::AddRecipeIngredient { line, .. } => line.id.to_string(),
            Self::UpdateRecipeIngredient { id, .. } | Self::RemoveRecipeIngredient { id } => {
                id.to_string()
            }
        }
    }
}

impl CatalogState {
    /// Apply one mutation, including any delete propagation it triggers.
    pub fn apply(&mut self, mutation: &Mutation) -> StoreResult<Propagation> {
        match mutation {
            Mutation::CreateCategory(category) => {
                self.insert_category(category.clone())?;
            }
            Mutation::RenameCategory { id, name } => self.rename_category(id, name)?,
            Mutation::DeleteCategory { id } => return self.delete_category(id),
            Mutation::CreateIngredient(ingredient) => {
                self.insert_ingredient(ingredient.clone())?;
            }
            Mutation::RenameIngredient { id, name } => self.rename_ingredient(id, name)?,
            Mutation::DeleteIngredient { id, orphans } => {
                return self.delete_ingredient(id, *orphans)
            }
            Mutation::CreateRecipe { recipe, lines } => {
                self.insert_recipe(recipe.clone(), lines.clone())?;
            }
            Mutation::UpdateRecipe { id, draft } => self.update_recipe(id, draft)?,
            Mutation::DeleteRecipe { id } => return self.delete_recipe(id),
            Mutation::SetRecipeIngredients { recipe, lines } => {
                return self.replace_lines(recipe, lines.clone())
            }
            Mutation::AddRecipeIngredient { line, position } => {
                self.insert_line(line.clone(), *position)?;
            }
            Mutation::UpdateRecipeIngredient {
                id,
                ingredient,
                quantity,
            } => self.update_line(id, *ingredient, quantity)?,
            Mutation::RemoveRecipeIngredient { id } => {
                let id = *id;
                self.remove_line(&id)?;
                return Ok(Propagation {
                    lines_removed: vec![id],
                    ..Propagation::default()
                });
            }
            Mutation::MoveRecipeIngredient { recipe, from, to } => {
                self.move_line(recipe, *from, *to)?
            }
        }
        Ok(Propagation::default())
    }

    /// Rebuild a catalog from journal records.
    ///
    /// A snapshot record replaces the state wholesale. A mutation that the
    /// rebuilt state rejects is logged and skipped.
    pub fn replay(records: impl IntoIterator<Item = JournalRecord>) -> (Self, ReplayReport) {
        let mut state = Self::new();
        let mut report = ReplayReport::default();
        for record in records {
            match record {
                JournalRecord::Snapshot(snapshot) => {
                    state = snapshot;
                    report.snapshots += 1;
                }
                JournalRecord::Mutation(mutation) => match state.apply(&mutation) {
                    Ok(_) => report.applied += 1,
                    Err(e) => {
                        warn!(
                            kind = %mutation.kind(),
                            target = %mutation.target_id(),
                            error = %e,
                            "journal mutation rejected during replay; skipping"
                        );
                        report.rejected += 1;
                    }
                },
            }
        }
        (state, report)
    }
}

/// Counts from [`CatalogState::replay`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub snapshots: usize,
    pub applied: usize,
    pub rejected: usize,
}
