//! Deterministic keyword classification of dishes into categories.
//!
//! # Responsibility
//! - Map a dish's name and description to matching catalog categories.
//!
//! # Invariants
//! - Pure: no I/O, same inputs always give the same output.
//! - Output keeps input category order and never contains unknown ids.
//!
//! Against the lowercase dish text, a category never matches when the first
//! archetype governing its name finds an exclusion keyword. Otherwise it
//! matches when:
//! 1. its full lowercase name occurs, or
//! 2. any of its whitespace-separated words longer than 3 chars occurs, or
//! 3. the governing archetype accepts the dish text.

pub mod rules;

use crate::model::category::{Category, CategoryId};
use crate::model::dish::{Dish, DishId};
pub use rules::{Archetype, ARCHETYPES, MEAT_KEYWORDS};
use std::collections::BTreeMap;

const MIN_CATEGORY_WORD_CHARS: usize = 4;

/// Rule-based classifier over an archetype table.
#[derive(Debug, Clone, Copy)]
pub struct RuleClassifier<'a> {
    archetypes: &'a [Archetype],
}

impl Default for RuleClassifier<'static> {
    fn default() -> Self {
        Self::new(ARCHETYPES)
    }
}

impl<'a> RuleClassifier<'a> {
    pub fn new(archetypes: &'a [Archetype]) -> Self {
        Self { archetypes }
    }

    /// Ids of every category in `categories` that matches `dish`.
    pub fn categorize_dish(&self, dish: &Dish, categories: &[Category]) -> Vec<CategoryId> {
        let dish_text = dish_text_blob(dish);
        categories
            .iter()
            .filter(|category| self.matches_category(&dish_text, &category.name))
            .map(|category| category.id)
            .collect()
    }

    /// Categorizes many dishes; dishes without matches are left out.
    pub fn batch_categorize(
        &self,
        dishes: &[Dish],
        categories: &[Category],
    ) -> BTreeMap<DishId, Vec<CategoryId>> {
        dishes
            .iter()
            .filter_map(|dish| {
                let ids = self.categorize_dish(dish, categories);
                (!ids.is_empty()).then_some((dish.id, ids))
            })
            .collect()
    }

    fn matches_category(&self, dish_text: &str, category_name: &str) -> bool {
        let category_name = category_name.to_lowercase();
        if category_name.trim().is_empty() {
            return false;
        }

        let archetype = self
            .archetypes
            .iter()
            .find(|archetype| archetype.governs(&category_name));
        if archetype.is_some_and(|archetype| archetype.excludes(dish_text)) {
            return false;
        }

        if dish_text.contains(category_name.as_str()) {
            return true;
        }
        let word_hit = category_name
            .split_whitespace()
            .filter(|word| word.chars().count() >= MIN_CATEGORY_WORD_CHARS)
            .any(|word| dish_text.contains(word));
        if word_hit {
            return true;
        }

        archetype.is_some_and(|archetype| archetype.accepts(dish_text))
    }
}

/// Categorizes with the default archetype table.
pub fn categorize_dish(dish: &Dish, categories: &[Category]) -> Vec<CategoryId> {
    RuleClassifier::default().categorize_dish(dish, categories)
}

/// Lowercase `name + " " + description text` used for matching.
pub fn dish_text_blob(dish: &Dish) -> String {
    let mut text = dish.name.to_lowercase();
    if dish.description.is_some() {
        text.push(' ');
        text.push_str(&dish.description_text().to_lowercase());
    }
    text
}
