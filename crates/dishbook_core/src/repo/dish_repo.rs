//! Dish store.
//!
//! # Responsibility
//! - Read the dish corpus for classification runs.
//! - Create, update and delete dishes for manual catalog flows.
//!
//! # Invariants
//! - Dish names are non-blank after trim.
//! - Blank descriptions are stored as `NULL`.
//! - `delete_dish` removes the dish's tags in the same transaction.

use crate::model::category::CategoryId;
use crate::model::dish::{normalize_description, Dish, DishId};
use crate::model::tag::Tag;
use crate::repo::tag_repo::{delete_dish_tags_in_tx, insert_tags_in_tx};
use crate::repo::{ensure_tables, parse_uuid, RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const DISH_SELECT_SQL: &str = "SELECT id, name, description FROM dishes";

/// Store contract for dishes.
pub trait DishStore {
    /// Every dish, ordered by name (case-insensitive) then id.
    fn get_dishes(&self) -> RepoResult<Vec<Dish>>;
    fn get_dish(&self, dish_id: DishId) -> RepoResult<Option<Dish>>;
    /// Inserts the dish and its initial tags atomically.
    fn create_dish(&self, dish: &Dish, category_ids: &[CategoryId]) -> RepoResult<DishId>;
    /// Replaces name and description.
    fn update_dish(&self, dish: &Dish) -> RepoResult<()>;
    /// Deletes the dish and its tags atomically.
    fn delete_dish(&self, dish_id: DishId) -> RepoResult<()>;
}

/// SQLite-backed dish store.
pub struct SqliteDishRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDishRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["dishes", "dish_categories"])?;
        Ok(Self { conn })
    }
}

impl DishStore for SqliteDishRepository<'_> {
    fn get_dishes(&self) -> RepoResult<Vec<Dish>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DISH_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut dishes = Vec::new();
        while let Some(row) = rows.next()? {
            dishes.push(parse_dish_row(row)?);
        }
        Ok(dishes)
    }

    fn get_dish(&self, dish_id: DishId) -> RepoResult<Option<Dish>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DISH_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([dish_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_dish_row(row)?)),
            None => Ok(None),
        }
    }

    fn create_dish(&self, dish: &Dish, category_ids: &[CategoryId]) -> RepoResult<DishId> {
        let name = validate_dish_name(&dish.name)?;
        let description = normalize_description(dish.description.clone());

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO dishes (id, name, description) VALUES (?1, ?2, ?3);",
            params![dish.id.to_string(), name, description],
        )?;
        insert_tags_in_tx(&tx, &Tag::for_dish(dish.id, category_ids))?;
        tx.commit()?;

        info!(
            "event=dish_create module=repo status=ok dish_id={} tags={}",
            dish.id,
            category_ids.len()
        );
        Ok(dish.id)
    }

    fn update_dish(&self, dish: &Dish) -> RepoResult<()> {
        let name = validate_dish_name(&dish.name)?;
        let description = normalize_description(dish.description.clone());

        let changed = self.conn.execute(
            "UPDATE dishes
             SET
                name = ?2,
                description = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![dish.id.to_string(), name, description],
        )?;
        if changed == 0 {
            return Err(RepoError::DishNotFound(dish.id));
        }
        Ok(())
    }

    fn delete_dish(&self, dish_id: DishId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed_tags = delete_dish_tags_in_tx(&tx, dish_id)?;
        let changed = tx.execute("DELETE FROM dishes WHERE id = ?1;", [dish_id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::DishNotFound(dish_id));
        }
        tx.commit()?;

        info!(
            "event=dish_delete module=repo status=ok dish_id={dish_id} removed_tags={removed_tags}"
        );
        Ok(())
    }
}

fn validate_dish_name(name: &str) -> RepoResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidInput("dish name must not be blank".to_string()));
    }
    Ok(trimmed)
}

fn parse_dish_row(row: &Row<'_>) -> RepoResult<Dish> {
    let id_text: String = row.get("id")?;
    Ok(Dish {
        id: parse_uuid(&id_text, "dishes.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
    })
}
