//! Auto-categorization use-case service.
//!
//! # Responsibility
//! - Run the rule classifier over the dish corpus in preview or apply mode.
//! - Bridge AI suggestions to catalog categories and apply them on request.
//!
//! # Invariants
//! - Dishes are processed strictly one after another.
//! - Preview never writes.
//! - A failure on one dish during `auto_categorize_dishes` is counted in
//!   `failed_dishes` and never aborts the run.
//! - `total_dishes == categorized + skipped + failed` for every run.

use crate::classify::RuleClassifier;
use crate::model::category::{Category, CategoryId};
use crate::model::dish::{Dish, DishId};
use crate::model::tag::{ClassificationStats, DishPreview, Suggestion, Tag};
use crate::repo::category_repo::CategoryStore;
use crate::repo::dish_repo::DishStore;
use crate::repo::tag_repo::TagStore;
use crate::repo::RepoError;
use crate::suggest::{LanguageModel, SuggestError, SuggestionClient};
use log::{info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const EMPTY_CATALOG_MESSAGE: &str = "no categories found; create categories first";

pub type CategorizationResult<T> = Result<T, CategorizationError>;

/// Errors surfaced by categorization use-cases.
#[derive(Debug)]
pub enum CategorizationError {
    /// Precondition violated, e.g. empty category catalog.
    Validation(String),
    /// Referenced dish does not exist.
    DishNotFound(DishId),
    /// Store read or write failure.
    Persistence(RepoError),
    /// AI suggestion failure.
    Suggest(SuggestError),
}

impl Display for CategorizationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::DishNotFound(dish_id) => write!(f, "dish not found: {dish_id}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::Suggest(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CategorizationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::Suggest(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CategorizationError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DishNotFound(dish_id) => Self::DishNotFound(dish_id),
            other => Self::Persistence(other),
        }
    }
}

impl From<SuggestError> for CategorizationError {
    fn from(value: SuggestError) -> Self {
        Self::Suggest(value)
    }
}

/// What happened to one dish in an apply run.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DishOutcome {
    /// Not overwriting and the dish already had these tags.
    AlreadyTagged(Vec<CategoryId>),
    NoMatch,
    Categorized(Vec<CategoryId>),
}

/// Orchestrates classification over injected stores.
pub struct CategorizationService<D: DishStore, C: CategoryStore, T: TagStore> {
    dishes: D,
    categories: C,
    tags: T,
    classifier: RuleClassifier<'static>,
}

impl<D: DishStore, C: CategoryStore, T: TagStore> CategorizationService<D, C, T> {
    /// Creates a service with the default archetype table.
    pub fn new(dishes: D, categories: C, tags: T) -> Self {
        Self {
            dishes,
            categories,
            tags,
            classifier: RuleClassifier::default(),
        }
    }

    /// Swaps in a classifier over a different archetype table.
    pub fn with_classifier(mut self, classifier: RuleClassifier<'static>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Current and rule-suggested categories for every dish. Read-only.
    pub fn preview_categorization(&self) -> CategorizationResult<Vec<DishPreview>> {
        let dishes = self.dishes.get_dishes()?;
        let categories = self.categories.get_categories()?;
        let by_id = index_by_id(&categories);

        let mut previews = Vec::with_capacity(dishes.len());
        for dish in dishes {
            let current_categories = self.categories.category_names_for_dish(dish.id)?;
            let suggested_categories = self
                .classifier
                .categorize_dish(&dish, &categories)
                .iter()
                .filter_map(|id| by_id.get(id).map(|category| Suggestion::from(*category)))
                .collect();
            previews.push(DishPreview {
                dish_id: dish.id,
                dish_name: dish.name,
                current_categories,
                suggested_categories,
            });
        }

        info!(
            "event=preview_categorization module=service status=ok dishes={}",
            previews.len()
        );
        Ok(previews)
    }

    /// Classifies and tags every dish, isolating per-dish failures.
    ///
    /// With `overwrite_existing = false`, dishes that already have tags are
    /// skipped without classification. With `true`, a dish's tag set is
    /// replaced whenever the rules find at least one category.
    ///
    /// # Errors
    /// - `Validation` when the category catalog is empty (nothing is processed).
    /// - `Persistence` when the corpus snapshot itself cannot be read.
    pub fn auto_categorize_dishes(
        &self,
        overwrite_existing: bool,
    ) -> CategorizationResult<ClassificationStats> {
        let started_at = Instant::now();
        let dishes = self.dishes.get_dishes()?;
        let categories = self.load_catalog()?;

        let mut stats = ClassificationStats {
            total_dishes: dishes.len(),
            ..ClassificationStats::default()
        };
        info!(
            "event=auto_categorize module=service status=start overwrite={} dishes={} categories={}",
            overwrite_existing,
            dishes.len(),
            categories.len()
        );

        for dish in &dishes {
            match self.process_dish(dish, &categories, overwrite_existing) {
                Ok(DishOutcome::Categorized(category_ids)) => {
                    stats.categorized_dishes += 1;
                    stats.categories_by_dish.insert(dish.id, category_ids);
                }
                Ok(DishOutcome::AlreadyTagged(_) | DishOutcome::NoMatch) => {
                    stats.skipped_dishes += 1;
                }
                Err(err) => {
                    warn!(
                        "event=auto_categorize_dish module=service status=error dish_id={} error={}",
                        dish.id, err
                    );
                    stats.failed_dishes += 1;
                }
            }
        }

        info!(
            "event=auto_categorize module=service status=ok total={} categorized={} skipped={} failed={} duration_ms={}",
            stats.total_dishes,
            stats.categorized_dishes,
            stats.skipped_dishes,
            stats.failed_dishes,
            started_at.elapsed().as_millis()
        );
        Ok(stats)
    }

    /// Applies the per-dish rules to one dish.
    ///
    /// Returns the applied ids, the existing ids when the dish was already
    /// tagged and `overwrite_existing` is false, or an empty list when no
    /// rule matched.
    pub fn categorize_single_dish(
        &self,
        dish_id: DishId,
        overwrite_existing: bool,
    ) -> CategorizationResult<Vec<CategoryId>> {
        let dish = self.require_dish(dish_id)?;
        let categories = self.load_catalog()?;

        let category_ids = match self.process_dish(&dish, &categories, overwrite_existing)? {
            DishOutcome::AlreadyTagged(ids) | DishOutcome::Categorized(ids) => ids,
            DishOutcome::NoMatch => Vec::new(),
        };
        info!(
            "event=categorize_dish module=service status=ok dish_id={dish_id} categories={}",
            category_ids.len()
        );
        Ok(category_ids)
    }

    /// Asks the AI client for categories that fit the dish and are not yet
    /// assigned to it. Nothing is written.
    pub fn suggest_for_dish<M: LanguageModel>(
        &self,
        client: &SuggestionClient<M>,
        dish_id: DishId,
    ) -> CategorizationResult<Vec<Suggestion>> {
        let dish = self.require_dish(dish_id)?;
        let categories = self.load_catalog()?;
        let assigned = self.tags.get_dish_category_ids(dish_id)?;

        let names = categories
            .iter()
            .map(|category| category.name.clone())
            .collect::<Vec<_>>();
        let suggested_names = client.suggest_categories(&dish.name, &names)?;

        let by_name = categories
            .iter()
            .map(|category| (category.name.as_str(), category))
            .collect::<HashMap<_, _>>();
        let suggestions = suggested_names
            .iter()
            .filter_map(|name| by_name.get(name.as_str()))
            .filter(|category| !assigned.contains(&category.id))
            .map(|category| Suggestion::from(*category))
            .collect::<Vec<_>>();

        info!(
            "event=suggest_for_dish module=service status=ok dish_id={dish_id} suggested={}",
            suggestions.len()
        );
        Ok(suggestions)
    }

    /// Persists accepted suggestions for one dish in a single batch.
    pub fn apply_suggestions(
        &self,
        dish_id: DishId,
        suggestions: &[Suggestion],
    ) -> CategorizationResult<()> {
        self.require_dish(dish_id)?;
        let category_ids = suggestions
            .iter()
            .map(|suggestion| suggestion.category_id)
            .collect::<Vec<_>>();
        self.tags.add_tags(&Tag::for_dish(dish_id, &category_ids))?;

        info!(
            "event=apply_suggestions module=service status=ok dish_id={dish_id} applied={}",
            category_ids.len()
        );
        Ok(())
    }

    fn process_dish(
        &self,
        dish: &Dish,
        categories: &[Category],
        overwrite_existing: bool,
    ) -> CategorizationResult<DishOutcome> {
        if !overwrite_existing {
            let existing = self.tags.get_dish_category_ids(dish.id)?;
            if !existing.is_empty() {
                return Ok(DishOutcome::AlreadyTagged(existing));
            }
        }

        let matched = self.classifier.categorize_dish(dish, categories);
        if matched.is_empty() {
            return Ok(DishOutcome::NoMatch);
        }

        if overwrite_existing {
            self.tags.replace_dish_tags(dish.id, &matched)?;
        } else {
            self.tags.add_tags(&Tag::for_dish(dish.id, &matched))?;
        }
        Ok(DishOutcome::Categorized(matched))
    }

    fn require_dish(&self, dish_id: DishId) -> CategorizationResult<Dish> {
        self.dishes
            .get_dish(dish_id)?
            .ok_or(CategorizationError::DishNotFound(dish_id))
    }

    fn load_catalog(&self) -> CategorizationResult<Vec<Category>> {
        let categories = self.categories.get_categories()?;
        if categories.is_empty() {
            return Err(CategorizationError::Validation(
                EMPTY_CATALOG_MESSAGE.to_string(),
            ));
        }
        Ok(categories)
    }
}

fn index_by_id(categories: &[Category]) -> HashMap<CategoryId, &Category> {
    categories
        .iter()
        .map(|category| (category.id, category))
        .collect()
}
