//! Dish↔category tag store.
//!
//! # Responsibility
//! - Own the `dish_categories` relation: batch insert, lookup, delete.
//!
//! # Invariants
//! - `add_tags` commits every pair or none.
//! - Re-adding an existing pair is a no-op (one row per pair).
//! - This store never deletes dishes or categories.

use crate::model::category::CategoryId;
use crate::model::dish::DishId;
use crate::model::tag::Tag;
use crate::repo::{ensure_tables, parse_uuid, RepoResult};
use log::debug;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// Store contract for the tag relation.
pub trait TagStore {
    /// Inserts all tags atomically. Empty input is a no-op.
    fn add_tags(&self, tags: &[Tag]) -> RepoResult<()>;
    /// Current category ids of one dish, in no particular order.
    fn get_dish_category_ids(&self, dish_id: DishId) -> RepoResult<Vec<CategoryId>>;
    /// Removes every tag of one dish. Succeeds when there is none.
    fn delete_dish_tags(&self, dish_id: DishId) -> RepoResult<()>;
    /// Replaces the dish's category set in one transaction.
    fn replace_dish_tags(&self, dish_id: DishId, category_ids: &[CategoryId]) -> RepoResult<()>;
}

/// SQLite-backed tag store.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Wraps a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["dish_categories"])?;
        Ok(Self { conn })
    }
}

impl TagStore for SqliteTagRepository<'_> {
    fn add_tags(&self, tags: &[Tag]) -> RepoResult<()> {
        if tags.is_empty() {
            return Ok(());
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        insert_tags_in_tx(&tx, tags)?;
        tx.commit()?;

        debug!(
            "event=tags_add module=repo status=ok count={}",
            tags.len()
        );
        Ok(())
    }

    fn get_dish_category_ids(&self, dish_id: DishId) -> RepoResult<Vec<CategoryId>> {
        load_category_ids(self.conn, dish_id)
    }

    fn delete_dish_tags(&self, dish_id: DishId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed = delete_dish_tags_in_tx(&tx, dish_id)?;
        tx.commit()?;

        debug!("event=tags_delete module=repo status=ok dish_id={dish_id} removed={removed}");
        Ok(())
    }

    fn replace_dish_tags(&self, dish_id: DishId, category_ids: &[CategoryId]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        delete_dish_tags_in_tx(&tx, dish_id)?;
        insert_tags_in_tx(&tx, &Tag::for_dish(dish_id, category_ids))?;
        tx.commit()?;

        debug!(
            "event=tags_replace module=repo status=ok dish_id={dish_id} count={}",
            category_ids.len()
        );
        Ok(())
    }
}

pub(crate) fn insert_tags_in_tx(tx: &Transaction<'_>, tags: &[Tag]) -> RepoResult<()> {
    let mut stmt = tx.prepare_cached(
        "INSERT OR IGNORE INTO dish_categories (dish_id, category_id)
         VALUES (?1, ?2);",
    )?;
    for tag in tags {
        stmt.execute(params![
            tag.dish_id.to_string(),
            tag.category_id.to_string()
        ])?;
    }
    Ok(())
}

pub(crate) fn delete_dish_tags_in_tx(tx: &Transaction<'_>, dish_id: DishId) -> RepoResult<usize> {
    let removed = tx.execute(
        "DELETE FROM dish_categories WHERE dish_id = ?1;",
        [dish_id.to_string()],
    )?;
    Ok(removed)
}

pub(crate) fn load_category_ids(conn: &Connection, dish_id: DishId) -> RepoResult<Vec<CategoryId>> {
    let mut stmt = conn.prepare_cached(
        "SELECT category_id
         FROM dish_categories
         WHERE dish_id = ?1;",
    )?;
    let mut rows = stmt.query([dish_id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "dish_categories.category_id")?);
    }
    Ok(ids)
}
