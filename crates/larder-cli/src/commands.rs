use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Context};
use colored::Colorize;
use serde::Serialize;

use larder_catalog::{
    Catalog, CatalogConfig, Category, CategoryId, CategorySection, Ingredient, IngredientId,
    IngredientLine, JournalConfig, OrphanLines, Propagation, Recipe, RecipeDetail, RecipeDraft,
    RecipeId, RecipeIngredientId, RecipeQuery, SearchFilter,
};

use crate::cli::*;

/// Journal used when neither `--store` nor the config names one.
const DEFAULT_STORE: &str = "larder.journal";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let catalog = open_catalog(cli.store.as_deref(), cli.config.as_deref())?;
    let out = Output(cli.format);
    match cli.command {
        Command::Category { action } => cmd_category(&catalog, out, action),
        Command::Ingredient { action } => cmd_ingredient(&catalog, out, action),
        Command::Recipe { action } => cmd_recipe(&catalog, out, action),
        Command::Sections { search } => {
            let sections = catalog.category_sections(&SearchFilter::from(search.as_deref()))?;
            out.emit(&sections, |s| print_sections(s))
        }
        Command::Compact => {
            catalog.compact()?;
            let path = catalog
                .journal_path()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            out.emit(&path, |p| println!("{} Compacted {}", "✓".green().bold(), p.bold()))
        }
        Command::Check => {
            catalog.audit()?;
            let stats = catalog.stats()?;
            out.emit(&stats, |s| {
                println!("{} Catalog integrity verified", "✓".green().bold());
                println!("  Categories:  {}", s.categories);
                println!("  Ingredients: {}", s.ingredients);
                println!("  Recipes:     {}", s.recipes);
                println!("  Lines:       {}", s.lines);
            })
        }
    }
}

pub(crate) fn open_catalog(store: Option<&Path>, config: Option<&Path>) -> anyhow::Result<Catalog> {
    let mut config = match config {
        Some(path) => CatalogConfig::load(path)?,
        None => CatalogConfig::default(),
    };
    let sync_mode = config
        .journal
        .as_ref()
        .map(|j| j.sync_mode)
        .unwrap_or_default();
    if let Some(path) = store {
        config.journal = Some(JournalConfig {
            path: path.to_path_buf(),
            sync_mode,
        });
    } else if config.journal.is_none() {
        config.journal = Some(JournalConfig::new(DEFAULT_STORE));
    }
    Ok(Catalog::open(config)?)
}

#[derive(Clone, Copy)]
struct Output(OutputFormat);

impl Output {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T)) -> anyhow::Result<()> {
        match self.0 {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => text(value),
        }
        Ok(())
    }
}

// ---- Categories ----

fn cmd_category(catalog: &Catalog, out: Output, action: CategoryAction) -> anyhow::Result<()> {
    match action {
        CategoryAction::Add { name } => {
            let c = catalog.create_category(&name)?;
            out.emit(&c, |c| println!("{} Created category {}", "✓".green().bold(), c.name.bold()))
        }
        CategoryAction::Rename { category, name } => {
            let id = find_category(catalog, &category)?.id;
            let c = catalog.update_category(&id, &name)?;
            out.emit(&c, |c| println!("Renamed category to {}", c.name.bold()))
        }
        CategoryAction::Rm { category } => {
            let c = find_category(catalog, &category)?;
            let report = catalog.delete_category(&c.id)?;
            out.emit(&report, |r| {
                println!("Deleted category {}", c.name.bold());
                print_propagation(r);
            })
        }
        CategoryAction::Ls { search } => {
            let list = catalog.categories(&SearchFilter::from(search.as_deref()))?;
            out.emit(&list, |list| {
                for c in list {
                    println!("{}  {}", c.name.bold(), c.id.short_id().dimmed());
                }
            })
        }
        CategoryAction::Show { category } => {
            let c = find_category(catalog, &category)?;
            let recipes = catalog.recipes_in_category(&c.id)?;
            out.emit(&recipes, |recipes| {
                println!("{}", c.name.bold().underline());
                print_recipes(recipes, &BTreeMap::new());
            })
        }
    }
}

// ---- Ingredients ----

fn cmd_ingredient(catalog: &Catalog, out: Output, action: IngredientAction) -> anyhow::Result<()> {
    match action {
        IngredientAction::Add { name } => {
            let i = catalog.create_ingredient(&name)?;
            out.emit(&i, |i| println!("{} Created ingredient {}", "✓".green().bold(), i.name.bold()))
        }
        IngredientAction::Rename { ingredient, name } => {
            let id = find_ingredient(catalog, &ingredient)?.id;
            let i = catalog.update_ingredient(&id, &name)?;
            out.emit(&i, |i| println!("Renamed ingredient to {}", i.name.bold()))
        }
        IngredientAction::Rm {
            ingredient,
            remove_lines,
        } => {
            let i = find_ingredient(catalog, &ingredient)?;
            let orphans = if remove_lines {
                OrphanLines::Remove
            } else {
                OrphanLines::Keep
            };
            let report = catalog.delete_ingredient_with(&i.id, orphans)?;
            out.emit(&report, |r| {
                println!("Deleted ingredient {}", i.name.bold());
                print_propagation(r);
            })
        }
        IngredientAction::Ls { search } => {
            let list = catalog.ingredients(&SearchFilter::from(search.as_deref()))?;
            out.emit(&list, |list| {
                for i in list {
                    println!("{}  {}", i.name.bold(), i.id.short_id().dimmed());
                }
            })
        }
        IngredientAction::Uses { ingredient } => {
            let i = find_ingredient(catalog, &ingredient)?;
            let recipes = catalog.recipes_using_ingredient(&i.id)?;
            let names = category_names(catalog)?;
            out.emit(&recipes, |recipes| print_recipes(recipes, &names))
        }
    }
}

// ---- Recipes ----

fn cmd_recipe(catalog: &Catalog, out: Output, action: RecipeAction) -> anyhow::Result<()> {
    match action {
        RecipeAction::Add(args) => {
            let category = args
                .category
                .as_deref()
                .map(|c| find_category(catalog, c).map(|c| c.id))
                .transpose()?;
            let mut draft = RecipeDraft::new(args.name)
                .with_summary(args.summary)
                .with_serving(args.serving)
                .with_time(args.time)
                .with_instructions(args.instructions)
                .with_category(category);
            if let Some(path) = &args.image {
                draft = draft.with_image(read_image(path)?);
            }
            let lines = parse_lines(catalog, &args.lines)?;
            let recipe = catalog.create_recipe(draft, lines)?;
            out.emit(&recipe, |r| println!("{} Created recipe {}", "✓".green().bold(), r.name.bold()))
        }
        RecipeAction::Edit(args) => {
            let current = find_recipe(catalog, &args.recipe)?;
            let mut draft = RecipeDraft::from(&current);
            if let Some(name) = args.name {
                draft.name = name;
            }
            if let Some(summary) = args.summary {
                draft.summary = summary;
            }
            if let Some(serving) = args.serving {
                draft.serving = serving;
            }
            if let Some(time) = args.time {
                draft.time = time;
            }
            if let Some(instructions) = args.instructions {
                draft.instructions = instructions;
            }
            if let Some(category) = args.category.as_deref() {
                draft.category = Some(find_category(catalog, category)?.id);
            }
            if args.no_category {
                draft.category = None;
            }
            if let Some(path) = &args.image {
                draft = draft.with_image(read_image(path)?);
            }
            if args.no_image {
                draft.image_data = None;
            }
            let recipe = catalog.update_recipe(&current.id, draft)?;
            out.emit(&recipe, |r| println!("Updated recipe {}", r.name.bold()))
        }
        RecipeAction::Rm { recipe } => {
            let r = find_recipe(catalog, &recipe)?;
            let report = catalog.delete_recipe(&r.id)?;
            out.emit(&report, |report| {
                println!("Deleted recipe {}", r.name.bold());
                print_propagation(report);
            })
        }
        RecipeAction::Ls { search, sort } => {
            let query = RecipeQuery::new().search(search.unwrap_or_default()).sort(sort);
            let recipes = catalog.recipes(&query)?;
            let names = category_names(catalog)?;
            out.emit(&recipes, |recipes| print_recipes(recipes, &names))
        }
        RecipeAction::Show { recipe } => {
            let id = find_recipe(catalog, &recipe)?.id;
            let detail = catalog
                .recipe_detail(&id)?
                .ok_or_else(|| anyhow!("recipe {id} disappeared"))?;
            out.emit(&detail, print_detail)
        }
        RecipeAction::Lines { action } => cmd_lines(catalog, out, action),
    }
}

fn cmd_lines(catalog: &Catalog, out: Output, action: LineAction) -> anyhow::Result<()> {
    match action {
        LineAction::Set { recipe, lines } => {
            let r = find_recipe(catalog, &recipe)?;
            let lines = parse_lines(catalog, &lines)?;
            let lines = catalog.set_recipe_ingredients(&r.id, lines)?;
            out.emit(&lines, |lines| {
                println!("Set {} lines on {}", lines.len(), r.name.bold())
            })
        }
        LineAction::Add { recipe, line, at } => {
            let r = find_recipe(catalog, &recipe)?;
            let line = parse_line(catalog, &line)?;
            let added = catalog.add_recipe_ingredient(&r.id, line, at)?;
            out.emit(&added, |_| println!("Added a line to {}", r.name.bold()))
        }
        LineAction::Edit {
            recipe,
            index,
            line,
        } => {
            let r = find_recipe(catalog, &recipe)?;
            let id = line_at(&r, index)?;
            let line = parse_line(catalog, &line)?;
            let updated = catalog.update_recipe_ingredient(&id, line)?;
            out.emit(&updated, |_| println!("Updated line {index} of {}", r.name.bold()))
        }
        LineAction::Rm { recipe, index } => {
            let r = find_recipe(catalog, &recipe)?;
            let id = line_at(&r, index)?;
            catalog.remove_recipe_ingredient(&id)?;
            out.emit(&id, |_| println!("Removed line {index} from {}", r.name.bold()))
        }
        LineAction::Mv { recipe, from, to } => {
            let r = find_recipe(catalog, &recipe)?;
            catalog.move_recipe_ingredient(&r.id, from, to)?;
            let order = catalog
                .recipe(&r.id)?
                .map(|r| r.ingredients)
                .unwrap_or_default();
            out.emit(&order, |_| println!("Moved line {from} to {to} in {}", r.name.bold()))
        }
    }
}

// ---- Lookup ----

fn find_category(catalog: &Catalog, key: &str) -> anyhow::Result<Category> {
    if let Ok(id) = key.parse::<CategoryId>() {
        if let Some(c) = catalog.category(&id)? {
            return Ok(c);
        }
    }
    catalog
        .read(|s| s.category_named(key.trim()).cloned())?
        .ok_or_else(|| anyhow!("no category named {key:?}"))
}

fn find_ingredient(catalog: &Catalog, key: &str) -> anyhow::Result<Ingredient> {
    if let Ok(id) = key.parse::<IngredientId>() {
        if let Some(i) = catalog.ingredient(&id)? {
            return Ok(i);
        }
    }
    catalog
        .read(|s| s.ingredient_named(key.trim()).cloned())?
        .ok_or_else(|| anyhow!("no ingredient named {key:?}"))
}

fn find_recipe(catalog: &Catalog, key: &str) -> anyhow::Result<Recipe> {
    if let Ok(id) = key.parse::<RecipeId>() {
        if let Some(r) = catalog.recipe(&id)? {
            return Ok(r);
        }
    }
    catalog
        .read(|s| s.recipe_named(key.trim()).cloned())?
        .ok_or_else(|| anyhow!("no recipe named {key:?}"))
}

fn line_at(recipe: &Recipe, index: usize) -> anyhow::Result<RecipeIngredientId> {
    recipe.ingredients.get(index).copied().ok_or_else(|| {
        anyhow!(
            "{} has {} lines; there is no line {index}",
            recipe.name,
            recipe.ingredients.len()
        )
    })
}

/// Parse `INGREDIENT=QUANTITY`. An empty ingredient part gives an unnamed
/// line; a missing `=` gives an empty quantity.
fn parse_line(catalog: &Catalog, text: &str) -> anyhow::Result<IngredientLine> {
    let (name, quantity) = text.split_once('=').unwrap_or((text, ""));
    let name = name.trim();
    let quantity = quantity.trim();
    if name.is_empty() {
        return Ok(IngredientLine::unnamed(quantity));
    }
    let ingredient = find_ingredient(catalog, name)?;
    Ok(IngredientLine::new(ingredient.id, quantity))
}

fn parse_lines(catalog: &Catalog, texts: &[String]) -> anyhow::Result<Vec<IngredientLine>> {
    texts.iter().map(|t| parse_line(catalog, t)).collect()
}

fn read_image(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading image {}", path.display()))
}

fn category_names(catalog: &Catalog) -> anyhow::Result<BTreeMap<CategoryId, String>> {
    Ok(catalog
        .categories(&SearchFilter::all())?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect())
}

// ---- Text rendering ----

fn print_recipes(recipes: &[Recipe], categories: &BTreeMap<CategoryId, String>) {
    if recipes.is_empty() {
        println!("{}", "(no recipes)".dimmed());
    }
    for r in recipes {
        let category = r
            .category
            .as_ref()
            .and_then(|c| categories.get(c))
            .map(|name| format!("  [{name}]").cyan().to_string())
            .unwrap_or_default();
        println!(
            "{}  serves {}, {} min{}",
            r.name.bold(),
            r.serving,
            r.time,
            category
        );
    }
}

fn print_detail(detail: &RecipeDetail) {
    let r = &detail.recipe;
    print!("{}", r.name.bold().underline());
    if let Some(c) = &detail.category {
        print!("  [{}]", c.name.cyan());
    }
    println!();
    if !r.summary.is_empty() {
        println!("{}", r.summary.italic());
    }
    println!("Serves {}, {} min", r.serving, r.time);
    if r.has_image() {
        println!("{}", "(has image)".dimmed());
    }

    println!("\n{}", "Ingredients".bold());
    if detail.lines.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (i, line) in detail.lines.iter().enumerate() {
        let name = match line.ingredient_name() {
            Some(name) => name.normal(),
            None => "(unnamed)".yellow(),
        };
        println!("  {i}. {name}  {}", line.quantity);
    }

    println!("\n{}", "Instructions".bold());
    if r.is_complete() {
        println!("{}", r.instructions);
    } else {
        println!("  {}", "(incomplete)".yellow());
    }
}

fn print_sections(sections: &[CategorySection]) {
    for section in sections {
        println!("{}", section.category.name.bold().underline());
        if section.is_empty() {
            println!("  {}", "(empty)".dimmed());
        }
        for r in &section.recipes {
            println!("  {}", r.name);
        }
    }
}

fn print_propagation(report: &Propagation) {
    if !report.recipes_uncategorized.is_empty() {
        println!("  {} recipe(s) now uncategorized", report.recipes_uncategorized.len());
    }
    if !report.lines_removed.is_empty() {
        println!("  {} ingredient line(s) removed", report.lines_removed.len());
    } else if !report.lines_nullified.is_empty() {
        println!("  {} ingredient line(s) left unnamed", report.lines_nullified.len());
    }
}
