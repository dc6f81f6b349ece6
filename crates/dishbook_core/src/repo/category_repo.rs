//! Category store.
//!
//! # Responsibility
//! - Read the category catalog for classification runs.
//! - Resolve category ids (and a dish's tags) to names.
//! - Create, rename and delete categories for manual catalog flows.
//!
//! # Invariants
//! - Category names are non-blank and unique case-insensitively.
//! - `delete_category` removes the category's tags in the same transaction.
//! - Id lookups are split into chunks of `ID_LOOKUP_CHUNK` and merged; no id
//!   is ever dropped.

use crate::model::category::{Category, CategoryId};
use crate::model::dish::DishId;
use crate::repo::tag_repo::load_category_ids;
use crate::repo::{
    ensure_tables, is_unique_violation, parse_uuid, placeholders, RepoError, RepoResult,
};
use log::{debug, info};
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

/// Maximum ids bound into one `IN (...)` lookup.
pub const ID_LOOKUP_CHUNK: usize = 10;

const CATEGORY_SELECT_SQL: &str = "SELECT id, name FROM categories";

/// Store contract for categories.
pub trait CategoryStore {
    /// Whole catalog, ordered by name (case-insensitive).
    fn get_categories(&self) -> RepoResult<Vec<Category>>;
    fn get_category(&self, category_id: CategoryId) -> RepoResult<Option<Category>>;
    /// Categories for the given ids; unknown ids are ignored.
    fn get_categories_by_ids(&self, category_ids: &[CategoryId]) -> RepoResult<Vec<Category>>;
    /// Names of the categories tagged on a dish, sorted case-insensitively.
    fn category_names_for_dish(&self, dish_id: DishId) -> RepoResult<Vec<String>>;
    fn create_category(&self, category: &Category) -> RepoResult<CategoryId>;
    fn rename_category(&self, category_id: CategoryId, name: &str) -> RepoResult<()>;
    /// Deletes the category and its tags atomically.
    fn delete_category(&self, category_id: CategoryId) -> RepoResult<()>;
}

/// SQLite-backed category store.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["categories", "dish_categories"])?;
        Ok(Self { conn })
    }
}

impl CategoryStore for SqliteCategoryRepository<'_> {
    fn get_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn get_category(&self, category_id: CategoryId) -> RepoResult<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([category_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_category_row(row)?)),
            None => Ok(None),
        }
    }

    fn get_categories_by_ids(&self, category_ids: &[CategoryId]) -> RepoResult<Vec<Category>> {
        if category_ids.len() > ID_LOOKUP_CHUNK {
            debug!(
                "event=category_lookup module=repo status=chunked ids={} chunk={}",
                category_ids.len(),
                ID_LOOKUP_CHUNK
            );
        }

        let mut categories = Vec::with_capacity(category_ids.len());
        for chunk in category_ids.chunks(ID_LOOKUP_CHUNK) {
            let sql = format!(
                "{CATEGORY_SELECT_SQL} WHERE id IN ({});",
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(chunk.iter().map(|id| id.to_string())))?;
            while let Some(row) = rows.next()? {
                categories.push(parse_category_row(row)?);
            }
        }
        Ok(categories)
    }

    fn category_names_for_dish(&self, dish_id: DishId) -> RepoResult<Vec<String>> {
        let category_ids = load_category_ids(self.conn, dish_id)?;
        if category_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut names = self
            .get_categories_by_ids(&category_ids)?
            .into_iter()
            .map(|category| category.name)
            .collect::<Vec<_>>();
        names.sort_by_key(|name| name.to_lowercase());
        Ok(names)
    }

    fn create_category(&self, category: &Category) -> RepoResult<CategoryId> {
        let name = validate_category_name(&category.name)?;
        self.conn
            .execute(
                "INSERT INTO categories (id, name) VALUES (?1, ?2);",
                params![category.id.to_string(), name],
            )
            .map_err(|err| map_name_conflict(err, name))?;

        info!(
            "event=category_create module=repo status=ok category_id={}",
            category.id
        );
        Ok(category.id)
    }

    fn rename_category(&self, category_id: CategoryId, name: &str) -> RepoResult<()> {
        let name = validate_category_name(name)?;
        let changed = self
            .conn
            .execute(
                "UPDATE categories SET name = ?2 WHERE id = ?1;",
                params![category_id.to_string(), name],
            )
            .map_err(|err| map_name_conflict(err, name))?;
        if changed == 0 {
            return Err(RepoError::CategoryNotFound(category_id));
        }
        Ok(())
    }

    fn delete_category(&self, category_id: CategoryId) -> RepoResult<()> {
        let id_text = category_id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed_tags = tx.execute(
            "DELETE FROM dish_categories WHERE category_id = ?1;",
            [id_text.as_str()],
        )?;
        let changed = tx.execute("DELETE FROM categories WHERE id = ?1;", [id_text.as_str()])?;
        if changed == 0 {
            return Err(RepoError::CategoryNotFound(category_id));
        }
        tx.commit()?;

        info!(
            "event=category_delete module=repo status=ok category_id={category_id} removed_tags={removed_tags}"
        );
        Ok(())
    }
}

fn validate_category_name(name: &str) -> RepoResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidInput(
            "category name must not be blank".to_string(),
        ));
    }
    Ok(trimmed)
}

fn map_name_conflict(err: rusqlite::Error, name: &str) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::DuplicateName(name.to_string())
    } else {
        err.into()
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let id_text: String = row.get("id")?;
    Ok(Category {
        id: parse_uuid(&id_text, "categories.id")?,
        name: row.get("name")?,
    })
}
