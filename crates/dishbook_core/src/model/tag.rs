//! Tag relation and classification result values.

use crate::model::category::{Category, CategoryId};
use crate::model::dish::DishId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One dish-category association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    pub dish_id: DishId,
    pub category_id: CategoryId,
}

impl Tag {
    pub fn new(dish_id: DishId, category_id: CategoryId) -> Self {
        Self {
            dish_id,
            category_id,
        }
    }

    /// Builds one tag per category for the same dish.
    pub fn for_dish(dish_id: DishId, category_ids: &[CategoryId]) -> Vec<Self> {
        category_ids
            .iter()
            .map(|category_id| Self::new(dish_id, *category_id))
            .collect()
    }
}

/// Category proposed by a classifier. Never persisted until applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category_id: CategoryId,
    pub category_name: String,
}

impl From<&Category> for Suggestion {
    fn from(category: &Category) -> Self {
        Self {
            category_id: category.id,
            category_name: category.name.clone(),
        }
    }
}

/// Aggregate counters for one auto-categorization run.
///
/// `total_dishes == categorized_dishes + skipped_dishes + failed_dishes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationStats {
    pub total_dishes: usize,
    pub categorized_dishes: usize,
    pub skipped_dishes: usize,
    pub failed_dishes: usize,
    /// Category ids applied to each categorized dish.
    pub categories_by_dish: BTreeMap<DishId, Vec<CategoryId>>,
}

/// Read-only preview row: what a dish has now and what the rules propose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DishPreview {
    pub dish_id: DishId,
    pub dish_name: String,
    /// Names of currently assigned categories, sorted case-insensitively.
    pub current_categories: Vec<String>,
    pub suggested_categories: Vec<Suggestion>,
}
