use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use larder_catalog::RecipeSort;

#[derive(Parser)]
#[command(
    name = "larder",
    about = "Larder: a recipe catalog with categories and ingredients",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Journal file holding the catalog.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Repeat for more detail (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage ingredients
    Ingredient {
        #[command(subcommand)]
        action: IngredientAction,
    },
    /// Manage recipes
    Recipe {
        #[command(subcommand)]
        action: RecipeAction,
    },
    /// List categories with their recipes
    Sections {
        #[arg(long)]
        search: Option<String>,
    },
    /// Rewrite the journal as a single snapshot
    Compact,
    /// Verify catalog integrity
    Check,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    Add {
        name: String,
    },
    Rename {
        /// Name or id of the category
        category: String,
        name: String,
    },
    /// Delete a category; its recipes become uncategorized
    Rm {
        category: String,
    },
    Ls {
        #[arg(long)]
        search: Option<String>,
    },
    /// List the recipes filed under a category
    Show {
        category: String,
    },
}

#[derive(Subcommand)]
pub enum IngredientAction {
    Add {
        name: String,
    },
    Rename {
        /// Name or id of the ingredient
        ingredient: String,
        name: String,
    },
    /// Delete an ingredient; lines using it keep their quantity
    Rm {
        ingredient: String,
        /// Also remove the lines that used the ingredient
        #[arg(long)]
        remove_lines: bool,
    },
    Ls {
        #[arg(long)]
        search: Option<String>,
    },
    /// List the recipes that use an ingredient
    Uses {
        ingredient: String,
    },
}

#[derive(Subcommand)]
pub enum RecipeAction {
    Add(RecipeAddArgs),
    Edit(RecipeEditArgs),
    /// Delete a recipe and its ingredient lines
    Rm {
        recipe: String,
    },
    Ls {
        /// Match against name or summary
        #[arg(long)]
        search: Option<String>,
        /// name, serving_asc, serving_desc, time_asc or time_desc
        #[arg(long, default_value = "name")]
        sort: RecipeSort,
    },
    Show {
        recipe: String,
    },
    /// Edit a recipe's ingredient lines
    Lines {
        #[command(subcommand)]
        action: LineAction,
    },
}

#[derive(Args)]
pub struct RecipeAddArgs {
    pub name: String,
    #[arg(long, default_value = "")]
    pub summary: String,
    #[arg(long, default_value_t = 1)]
    pub serving: u32,
    /// Minutes
    #[arg(long, default_value_t = 5)]
    pub time: u32,
    #[arg(long, default_value = "")]
    pub instructions: String,
    #[arg(long)]
    pub category: Option<String>,
    /// Image file to attach
    #[arg(long)]
    pub image: Option<PathBuf>,
    /// Ingredient line as INGREDIENT=QUANTITY (repeatable)
    #[arg(long = "line")]
    pub lines: Vec<String>,
}

#[derive(Args)]
pub struct RecipeEditArgs {
    /// Name or id of the recipe
    pub recipe: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub summary: Option<String>,
    #[arg(long)]
    pub serving: Option<u32>,
    #[arg(long)]
    pub time: Option<u32>,
    #[arg(long)]
    pub instructions: Option<String>,
    #[arg(long, conflicts_with = "no_category")]
    pub category: Option<String>,
    #[arg(long)]
    pub no_category: bool,
    #[arg(long, conflicts_with = "no_image")]
    pub image: Option<PathBuf>,
    #[arg(long)]
    pub no_image: bool,
}

#[derive(Subcommand)]
pub enum LineAction {
    /// Replace every line of a recipe
    Set {
        recipe: String,
        /// Ingredient line as INGREDIENT=QUANTITY (repeatable)
        #[arg(long = "line")]
        lines: Vec<String>,
    },
    Add {
        recipe: String,
        /// INGREDIENT=QUANTITY
        line: String,
        /// Insert at this position instead of appending
        #[arg(long)]
        at: Option<usize>,
    },
    /// Change the ingredient or quantity of the line at INDEX
    Edit {
        recipe: String,
        index: usize,
        line: String,
    },
    Rm {
        recipe: String,
        index: usize,
    },
    Mv {
        recipe: String,
        from: usize,
        to: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_recipe_listing() {
        let cli = Cli::try_parse_from([
            "larder", "--format", "json", "recipe", "ls", "--search", "pie", "--sort", "serving_desc",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Command::Recipe {
                action: RecipeAction::Ls { search, sort },
            } => {
                assert_eq!(search.as_deref(), Some("pie"));
                assert_eq!(sort, RecipeSort::ServingDesc);
            }
            _ => panic!("expected recipe ls"),
        }
    }

    #[test]
    fn rejects_unknown_sort() {
        assert!(Cli::try_parse_from(["larder", "recipe", "ls", "--sort", "calories"]).is_err());
    }

    #[test]
    fn repeatable_lines_and_verbosity() {
        let cli = Cli::try_parse_from([
            "larder", "-vv", "recipe", "add", "Bread", "--line", "Flour=500 g", "--line", "=a pinch",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Recipe {
                action: RecipeAction::Add(args),
            } => assert_eq!(args.lines, ["Flour=500 g", "=a pinch"]),
            _ => panic!("expected recipe add"),
        }
    }
}
