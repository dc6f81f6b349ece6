//! Catalog domain model.
//!
//! # Responsibility
//! - Define dishes, categories and the tag relation between them.
//! - Define the ephemeral values produced by classification runs.
//!
//! # Invariants
//! - Dishes and categories are identified by stable UUIDs.
//! - A tag is identified only by its `(dish_id, category_id)` pair.

pub mod category;
pub mod dish;
pub mod tag;
