//! Command-line front end for the dish catalog.
//!
//! Every subcommand opens the catalog database, runs one core operation and
//! prints a plain-text (or JSON) result to stdout.

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use dishbook_core::{
    core_version, default_log_level, init_logging, open_db, CategorizationService, Category,
    CategoryStore, Dish, DishId, DishStore, SqliteCategoryRepository, SqliteDishRepository,
    SqliteTagRepository, SuggestionClient, SuggestionConfig, Tag, TagStore,
};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const DEFAULT_DB: &str = "dishbook.sqlite3";

#[derive(Parser, Debug)]
#[command(name = "dishbook", version = core_version(), about = "Dish catalog with automatic categorization")]
struct Cli {
    #[arg(long, global = true, default_value = DEFAULT_DB)]
    db: PathBuf,
    /// Directory for rolling log files. Logging is off when omitted.
    #[arg(long = "log-dir", global = true)]
    log_dir: Option<PathBuf>,
    #[arg(long = "log-level", global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a category.
    AddCategory { name: String },
    /// Create a dish, optionally tagged with existing categories.
    AddDish {
        name: String,
        /// Plain text or a rich-text delta JSON document.
        #[arg(long)]
        description: Option<String>,
        /// Category name or id; repeatable.
        #[arg(long = "category")]
        categories: Vec<String>,
    },
    /// List dishes with their categories, or the category catalog.
    List {
        #[arg(long, action = ArgAction::SetTrue)]
        categories: bool,
    },
    /// Assign categories to a dish.
    Tag {
        dish: Uuid,
        #[arg(required = true)]
        categories: Vec<String>,
    },
    /// Remove every category from a dish.
    Untag { dish: Uuid },
    /// Show current and rule-suggested categories for every dish.
    Preview {
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Run rule-based categorization over all dishes.
    Auto {
        #[arg(long, action = ArgAction::SetTrue)]
        overwrite: bool,
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Run rule-based categorization for one dish.
    Categorize {
        dish: Uuid,
        #[arg(long, action = ArgAction::SetTrue)]
        overwrite: bool,
    },
    /// Ask the language model for category suggestions (reads GEMINI_* env).
    Suggest {
        dish: Uuid,
        /// Persist the suggestions as tags.
        #[arg(long, action = ArgAction::SetTrue)]
        apply: bool,
    },
    DeleteDish { dish: Uuid },
    /// Delete a category by name or id; its tags go with it.
    DeleteCategory { category: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = absolute_dir(log_dir)?;
        init_logging(level, &log_dir.to_string_lossy())
            .map_err(|message| anyhow!(message))
            .context("failed to initialize logging")?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open catalog {}", cli.db.display()))?;
    run(&conn, cli.command)
}

fn run(conn: &Connection, command: Commands) -> Result<()> {
    let dishes = SqliteDishRepository::try_new(conn)?;
    let categories = SqliteCategoryRepository::try_new(conn)?;
    let tags = SqliteTagRepository::try_new(conn)?;

    match command {
        Commands::AddCategory { name } => {
            let id = categories.create_category(&Category::new(name))?;
            println!("{id}");
        }
        Commands::AddDish {
            name,
            description,
            categories: category_refs,
        } => {
            let category_ids = category_refs
                .iter()
                .map(|reference| resolve_category(&categories, reference).map(|c| c.id))
                .collect::<Result<Vec<_>>>()?;
            let mut dish = Dish::new(name);
            if let Some(description) = description {
                dish = dish.with_description(description);
            }
            let id = dishes.create_dish(&dish, &category_ids)?;
            println!("{id}");
        }
        Commands::List { categories: true } => {
            for category in categories.get_categories()? {
                println!("{}\t{}", category.id, category.name);
            }
        }
        Commands::List { categories: false } => {
            for dish in dishes.get_dishes()? {
                let names = categories.category_names_for_dish(dish.id)?;
                println!("{}\t{}\t[{}]", dish.id, dish.name, names.join(", "));
            }
        }
        Commands::Tag {
            dish,
            categories: category_refs,
        } => {
            require_dish(&dishes, dish)?;
            let new_tags = category_refs
                .iter()
                .map(|reference| resolve_category(&categories, reference))
                .map(|category| category.map(|c| Tag::new(dish, c.id)))
                .collect::<Result<Vec<_>>>()?;
            tags.add_tags(&new_tags)?;
            println!("tagged {} categories", new_tags.len());
        }
        Commands::Untag { dish } => {
            require_dish(&dishes, dish)?;
            tags.delete_dish_tags(dish)?;
            println!("untagged {dish}");
        }
        Commands::Preview { json } => {
            let service = CategorizationService::new(dishes, categories, tags);
            let previews = service.preview_categorization()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&previews)?);
                return Ok(());
            }
            for preview in previews {
                let suggested = preview
                    .suggested_categories
                    .iter()
                    .map(|s| s.category_name.as_str())
                    .collect::<Vec<_>>();
                println!(
                    "{}\t{}\tcurrent=[{}]\tsuggested=[{}]",
                    preview.dish_id,
                    preview.dish_name,
                    preview.current_categories.join(", "),
                    suggested.join(", ")
                );
            }
        }
        Commands::Auto { overwrite, json } => {
            let service = CategorizationService::new(dishes, categories, tags);
            let stats = service.auto_categorize_dishes(overwrite)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!(
                    "total={} categorized={} skipped={} failed={}",
                    stats.total_dishes,
                    stats.categorized_dishes,
                    stats.skipped_dishes,
                    stats.failed_dishes
                );
            }
        }
        Commands::Categorize { dish, overwrite } => {
            let service = CategorizationService::new(dishes, categories, tags);
            for id in service.categorize_single_dish(dish, overwrite)? {
                println!("{id}");
            }
        }
        Commands::Suggest { dish, apply } => {
            let config = SuggestionConfig::from_env()?;
            let client = SuggestionClient::from_config(&config)?;
            let service = CategorizationService::new(dishes, categories, tags);
            let suggestions = service.suggest_for_dish(&client, dish)?;
            for suggestion in &suggestions {
                println!("{}\t{}", suggestion.category_id, suggestion.category_name);
            }
            if apply && !suggestions.is_empty() {
                service.apply_suggestions(dish, &suggestions)?;
                println!("applied {} suggestions", suggestions.len());
            }
        }
        Commands::DeleteDish { dish } => {
            dishes.delete_dish(dish)?;
            println!("deleted {dish}");
        }
        Commands::DeleteCategory { category } => {
            let category = resolve_category(&categories, &category)?;
            categories.delete_category(category.id)?;
            println!("deleted {}", category.id);
        }
    }
    Ok(())
}

/// Looks a category up by id first, then by case-insensitive name.
fn resolve_category(store: &impl CategoryStore, reference: &str) -> Result<Category> {
    if let Ok(id) = Uuid::parse_str(reference.trim()) {
        return store
            .get_category(id)?
            .ok_or_else(|| anyhow!("category not found: {id}"));
    }
    let wanted = reference.trim().to_lowercase();
    store
        .get_categories()?
        .into_iter()
        .find(|category| category.name.to_lowercase() == wanted)
        .ok_or_else(|| anyhow!("category not found: {reference}"))
}

fn require_dish(store: &impl DishStore, dish_id: DishId) -> Result<Dish> {
    store
        .get_dish(dish_id)?
        .ok_or_else(|| anyhow!("dish not found: {dish_id}"))
}

fn absolute_dir(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    Ok(cwd.join(path))
}
