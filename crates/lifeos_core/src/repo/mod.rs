//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Read paths reject invalid persisted state instead of masking it.
//! - Multi-row writes commit in a single transaction.

use crate::db::DbError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod diagnostic_repo;
pub mod profile_repo;
pub mod progress_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for profile, progress and diagnostic storage.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(String),
    InvalidData(String),
    /// Key is owned by the progression engine and cannot be written directly.
    ReservedKey(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::ReservedKey(key) => write!(f, "profile key `{key}` is reserved"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; was the database migrated?")
            }
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

fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for table in tables {
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
            return Err(RepoError::MissingRequiredTable(*table));
        }
    }
    Ok(())
}

fn u64_to_db(value: u64, field: &str) -> RepoResult<i64> {
    i64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("{field} value {value} exceeds storage range")))
}

fn u64_from_db(value: i64, field: &str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative {field} value `{value}`")))
}
