//! Core domain logic for Dishbook.
//! Dish catalog storage, rule-based categorization and AI suggestions.

pub mod classify;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod suggest;

pub use classify::{categorize_dish, RuleClassifier};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{Category, CategoryId};
pub use model::dish::{Dish, DishId, RichTextDelta};
pub use model::tag::{ClassificationStats, DishPreview, Suggestion, Tag};
pub use repo::category_repo::{CategoryStore, SqliteCategoryRepository};
pub use repo::dish_repo::{DishStore, SqliteDishRepository};
pub use repo::tag_repo::{SqliteTagRepository, TagStore};
pub use repo::{RepoError, RepoResult};
pub use service::{CategorizationError, CategorizationResult, CategorizationService};
pub use suggest::{
    ConfigError, GeminiModel, LanguageModel, ModelOutcome, SuggestError, SuggestionClient,
    SuggestionConfig,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
