use std::path::Path;
use std::sync::RwLock;

use serde::Serialize;
use tracing::{debug, info, warn};

use larder_query::{self as query, CategorySection, RecipeDetail, RecipeQuery, SearchFilter};
use larder_store::{
    CatalogRead, CatalogState, Journal, JournalRecord, Mutation, OrphanLines, Propagation,
};
use larder_types::{
    Category, CategoryId, Ingredient, IngredientId, IngredientLine, Recipe, RecipeDraft, RecipeId,
    RecipeIngredient, RecipeIngredientId,
};

use crate::config::{CatalogConfig, Limits};
use crate::error::{CatalogError, CatalogResult};
use crate::events::{ChangeEvent, ChangeFilter, ChangeRouter, ChangeStream};
use crate::validation::{check_draft, check_name};

/// Record counts of a catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub categories: usize,
    pub ingredients: usize,
    pub recipes: usize,
    pub lines: usize,
}

struct Committed {
    state: CatalogState,
    /// Number of mutations committed since open.
    sequence: u64,
}

/// The recipe catalog.
///
/// Every change goes through one of the mutation methods. A mutation is
/// validated, applied to a working copy of the tables, journaled, and only
/// then published. Readers never see a half-applied change.
pub struct Catalog {
    committed: RwLock<Committed>,
    journal: Option<Journal>,
    router: ChangeRouter,
    limits: Limits,
}

impl Catalog {
    /// Open a catalog, replaying its journal if one is configured.
    pub fn open(config: CatalogConfig) -> CatalogResult<Self> {
        config.check()?;
        let (state, journal) = match &config.journal {
            Some(journal_config) => {
                let journal = Journal::open(journal_config)?;
                let (state, report) = CatalogState::replay(journal.recover()?);
                if report.rejected > 0 {
                    warn!(rejected = report.rejected, "journal replay skipped mutations");
                }
                state.audit()?;
                info!(
                    path = %journal.path().display(),
                    snapshots = report.snapshots,
                    applied = report.applied,
                    recipes = state.recipe_count(),
                    "catalog opened"
                );
                (state, Some(journal))
            }
            None => {
                debug!("in-memory catalog opened");
                (CatalogState::new(), None)
            }
        };

        Ok(Self {
            committed: RwLock::new(Committed { state, sequence: 0 }),
            journal,
            router: ChangeRouter::new(config.channel_capacity),
            limits: config.limits,
        })
    }

    /// A catalog with no journal and default limits.
    pub fn in_memory() -> CatalogResult<Self> {
        Self::open(CatalogConfig::in_memory())
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Path of the journal, if the catalog is persistent.
    pub fn journal_path(&self) -> Option<&Path> {
        self.journal.as_ref().map(Journal::path)
    }

    // ---- Categories ----

    pub fn create_category(&self, name: &str) -> CatalogResult<Category> {
        let category = Category {
            id: CategoryId::new(),
            name: check_name("name", name)?,
        };
        self.commit(Mutation::CreateCategory(category.clone()))?;
        Ok(category)
    }

    /// Rename a category.
    pub fn update_category(&self, id: &CategoryId, name: &str) -> CatalogResult<Category> {
        let name = check_name("name", name)?;
        self.commit_returning(Mutation::RenameCategory { id: *id, name }, |s| {
            s.category(id).cloned()
        })
    }

    /// Delete a category. Its recipes survive with no category.
    pub fn delete_category(&self, id: &CategoryId) -> CatalogResult<Propagation> {
        self.commit(Mutation::DeleteCategory { id: *id })
    }

    // ---- Ingredients ----

    pub fn create_ingredient(&self, name: &str) -> CatalogResult<Ingredient> {
        let ingredient = Ingredient {
            id: IngredientId::new(),
            name: check_name("name", name)?,
        };
        self.commit(Mutation::CreateIngredient(ingredient.clone()))?;
        Ok(ingredient)
    }

    /// Rename an ingredient.
    pub fn update_ingredient(&self, id: &IngredientId, name: &str) -> CatalogResult<Ingredient> {
        let name = check_name("name", name)?;
        self.commit_returning(Mutation::RenameIngredient { id: *id, name }, |s| {
            s.ingredient(id).cloned()
        })
    }

    /// Delete an ingredient, leaving unnamed lines behind in recipes that
    /// used it.
    pub fn delete_ingredient(&self, id: &IngredientId) -> CatalogResult<Propagation> {
        self.delete_ingredient_with(id, OrphanLines::Keep)
    }

    pub fn delete_ingredient_with(
        &self,
        id: &IngredientId,
        orphans: OrphanLines,
    ) -> CatalogResult<Propagation> {
        self.commit(Mutation::DeleteIngredient { id: *id, orphans })
    }

    // ---- Recipes ----

    /// Create a recipe with its ingredient lines in the given order.
    pub fn create_recipe(
        &self,
        draft: RecipeDraft,
        lines: Vec<IngredientLine>,
    ) -> CatalogResult<Recipe> {
        let draft = check_draft(&draft, &self.limits)?;
        let id = RecipeId::new();
        let lines = build_lines(id, lines);
        let recipe = Recipe {
            id,
            name: draft.name,
            summary: draft.summary,
            serving: draft.serving,
            time: draft.time,
            instructions: draft.instructions,
            image_data: draft.image_data,
            category: draft.category,
            ingredients: lines.iter().map(|l| l.id).collect(),
        };
        self.commit(Mutation::CreateRecipe {
            recipe: recipe.clone(),
            lines,
        })?;
        Ok(recipe)
    }

    /// Replace a recipe's fields. The ingredient list is left alone.
    pub fn update_recipe(&self, id: &RecipeId, draft: RecipeDraft) -> CatalogResult<Recipe> {
        let draft = check_draft(&draft, &self.limits)?;
        self.commit_returning(Mutation::UpdateRecipe { id: *id, draft }, |s| {
            s.recipe(id).cloned()
        })
    }

    /// Delete a recipe and every line it owns.
    pub fn delete_recipe(&self, id: &RecipeId) -> CatalogResult<Propagation> {
        self.commit(Mutation::DeleteRecipe { id: *id })
    }

    // ---- Ingredient lines ----

    /// Atomically replace a recipe's whole ingredient list.
    pub fn set_recipe_ingredients(
        &self,
        recipe: &RecipeId,
        lines: Vec<IngredientLine>,
    ) -> CatalogResult<Vec<RecipeIngredient>> {
        let lines = build_lines(*recipe, lines);
        self.commit(Mutation::SetRecipeIngredients {
            recipe: *recipe,
            lines: lines.clone(),
        })?;
        Ok(lines)
    }

    /// Add one line, at `position` or at the end.
    pub fn add_recipe_ingredient(
        &self,
        recipe: &RecipeId,
        line: IngredientLine,
        position: Option<usize>,
    ) -> CatalogResult<RecipeIngredient> {
        let line = RecipeIngredient {
            id: RecipeIngredientId::new(),
            recipe: *recipe,
            ingredient: line.ingredient,
            quantity: line.quantity,
        };
        self.commit(Mutation::AddRecipeIngredient {
            line: line.clone(),
            position,
        })?;
        Ok(line)
    }

    pub fn update_recipe_ingredient(
        &self,
        id: &RecipeIngredientId,
        line: IngredientLine,
    ) -> CatalogResult<RecipeIngredient> {
        let mutation = Mutation::UpdateRecipeIngredient {
            id: *id,
            ingredient: line.ingredient,
            quantity: line.quantity,
        };
        self.commit_returning(mutation, |s| s.line(id).cloned())
    }

    pub fn remove_recipe_ingredient(&self, id: &RecipeIngredientId) -> CatalogResult<()> {
        self.commit(Mutation::RemoveRecipeIngredient { id: *id })
            .map(drop)
    }

    /// Move the line at index `from` to index `to`.
    pub fn move_recipe_ingredient(
        &self,
        recipe: &RecipeId,
        from: usize,
        to: usize,
    ) -> CatalogResult<()> {
        self.commit(Mutation::MoveRecipeIngredient {
            recipe: *recipe,
            from,
            to,
        })
        .map(drop)
    }

    // ---- Reads ----

    /// Run `f` against a consistent view of the catalog.
    pub fn read<R>(&self, f: impl FnOnce(&CatalogState) -> R) -> CatalogResult<R> {
        let committed = self
            .committed
            .read()
            .map_err(|_| CatalogError::LockPoisoned)?;
        Ok(f(&committed.state))
    }

    pub fn category(&self, id: &CategoryId) -> CatalogResult<Option<Category>> {
        self.read(|s| s.category(id).cloned())
    }

    pub fn ingredient(&self, id: &IngredientId) -> CatalogResult<Option<Ingredient>> {
        self.read(|s| s.ingredient(id).cloned())
    }

    pub fn recipe(&self, id: &RecipeId) -> CatalogResult<Option<Recipe>> {
        self.read(|s| s.recipe(id).cloned())
    }

    pub fn categories(&self, filter: &SearchFilter) -> CatalogResult<Vec<Category>> {
        self.read(|s| query::list_categories(s, filter))
    }

    pub fn ingredients(&self, filter: &SearchFilter) -> CatalogResult<Vec<Ingredient>> {
        self.read(|s| query::list_ingredients(s, filter))
    }

    pub fn recipes(&self, q: &RecipeQuery) -> CatalogResult<Vec<Recipe>> {
        self.read(|s| query::list_recipes(s, q))
    }

    pub fn recipes_in_category(&self, id: &CategoryId) -> CatalogResult<Vec<Recipe>> {
        self.read(|s| query::recipes_in_category(s, id))
    }

    pub fn recipes_using_ingredient(&self, id: &IngredientId) -> CatalogResult<Vec<Recipe>> {
        self.read(|s| query::recipes_using_ingredient(s, id))
    }

    pub fn uncategorized_recipes(&self) -> CatalogResult<Vec<Recipe>> {
        self.read(|s| query::uncategorized_recipes(s))
    }

    pub fn recipe_detail(&self, id: &RecipeId) -> CatalogResult<Option<RecipeDetail>> {
        self.read(|s| query::recipe_detail(s, id))
    }

    pub fn category_sections(&self, filter: &SearchFilter) -> CatalogResult<Vec<CategorySection>> {
        self.read(|s| query::category_sections(s, filter))
    }

    pub fn stats(&self) -> CatalogResult<CatalogStats> {
        self.read(|s| CatalogStats {
            categories: s.category_count(),
            ingredients: s.ingredient_count(),
            recipes: s.recipe_count(),
            lines: s.line_count(),
        })
    }

    /// Check every relational invariant of the committed state.
    pub fn audit(&self) -> CatalogResult<()> {
        self.read(|s| s.audit())?.map_err(CatalogError::from)
    }

    // ---- Changes and maintenance ----

    /// Receive an event for every committed mutation.
    pub fn subscribe(&self) -> ChangeStream {
        self.router.subscribe(ChangeFilter::all())
    }

    pub fn subscribe_filtered(&self, filter: ChangeFilter) -> ChangeStream {
        self.router.subscribe(filter)
    }

    /// Rewrite the journal as one snapshot of the current state.
    ///
    /// Does nothing for an in-memory catalog.
    pub fn compact(&self) -> CatalogResult<()> {
        let Some(journal) = &self.journal else {
            return Ok(());
        };
        let committed = self
            .committed
            .write()
            .map_err(|_| CatalogError::LockPoisoned)?;
        let before = journal.offset()?;
        journal.compact(&committed.state)?;
        info!(before, after = journal.offset()?, "journal compacted");
        Ok(())
    }

    /// Apply, journal, publish.
    fn commit(&self, mutation: Mutation) -> CatalogResult<Propagation> {
        self.commit_with(mutation, |_, cascade| Some(cascade.clone()))
    }

    /// Commit and return the record `extract` reads from the new state.
    fn commit_returning<T>(
        &self,
        mutation: Mutation,
        extract: impl FnOnce(&CatalogState) -> Option<T>,
    ) -> CatalogResult<T> {
        self.commit_with(mutation, |state, _| extract(state))
    }

    /// The extracted value is read from the new state before the write
    /// guard is released, so a later commit cannot get in between.
    fn commit_with<T>(
        &self,
        mutation: Mutation,
        extract: impl FnOnce(&CatalogState, &Propagation) -> Option<T>,
    ) -> CatalogResult<T> {
        let mut committed = self
            .committed
            .write()
            .map_err(|_| CatalogError::LockPoisoned)?;

        let mut working = committed.state.clone();
        let cascade = working.apply(&mutation)?;
        let output = extract(&working, &cascade).ok_or_else(|| {
            CatalogError::IntegrityViolation(format!(
                "{} {} missing after {:?}",
                mutation.kind(),
                mutation.target_id(),
                mutation.action()
            ))
        })?;
        if let Some(journal) = &self.journal {
            journal
                .append(&JournalRecord::Mutation(mutation.clone()))
                .map_err(CatalogError::Journal)?;
        }
        committed.state = working;
        committed.sequence += 1;

        debug!(
            sequence = committed.sequence,
            kind = %mutation.kind(),
            target = %mutation.target_id(),
            cascaded = !cascade.is_empty(),
            "mutation committed"
        );
        self.router.route(&ChangeEvent::from_mutation(
            committed.sequence,
            &mutation,
            cascade,
        ));
        Ok(output)
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("journal", &self.journal)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

fn build_lines(recipe: RecipeId, lines: Vec<IngredientLine>) -> Vec<RecipeIngredient> {
    lines
        .into_iter()
        .map(|line| RecipeIngredient {
            id: RecipeIngredientId::new(),
            recipe,
            ingredient: line.ingredient,
            quantity: line.quantity,
        })
        .collect()
}
