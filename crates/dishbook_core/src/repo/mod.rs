//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the store contracts the categorization core depends on
//!   (`TagStore`, `DishStore`, `CategoryStore`).
//! - Keep SQL inside the persistence boundary.
//!
//! # Invariants
//! - Multi-row writes run in one immediate transaction: all rows or none.
//! - Deleting a dish or a category removes its tags in the same transaction.

use crate::db::DbError;
use crate::model::category::CategoryId;
use crate::model::dish::DishId;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod category_repo;
pub mod dish_repo;
pub mod tag_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for catalog stores.
#[derive(Debug)]
pub enum RepoError {
    /// Transport or constraint failure reported by SQLite.
    Db(DbError),
    DishNotFound(DishId),
    CategoryNotFound(CategoryId),
    /// A category with the same (case-insensitive) name already exists.
    DuplicateName(String),
    /// Caller input rejected before touching storage.
    InvalidInput(String),
    /// Persisted row cannot be decoded.
    InvalidData(String),
    /// Connection was not migrated to the catalog schema.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DishNotFound(id) => write!(f, "dish not found: {id}"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::DuplicateName(name) => write!(f, "category `{name}` already exists"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// `?, ?, ?` placeholder list for an `IN (...)` clause.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Fails with `MissingRequiredTable` unless every table exists.
pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}
