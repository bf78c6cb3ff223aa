//! Key-value profile document.
//!
//! # Responsibility
//! - Store arbitrary profile settings as string pairs.
//! - Guard engine-owned keys against direct writes.
//!
//! # Invariants
//! - Keys are trimmed and non-empty.
//! - Reserved keys are written only by progression commits.

use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Cumulative XP of the user, stored as a decimal string.
pub const PROFILE_KEY_TOTAL_XP: &str = "total_xp";
/// Armed state of the streak catalyst (`0|1`).
pub const PROFILE_KEY_STREAK_CATALYST: &str = "streak_catalyst";

const RESERVED_KEYS: &[&str] = &[PROFILE_KEY_TOTAL_XP, PROFILE_KEY_STREAK_CATALYST];

/// Repository interface for the profile document.
pub trait ProfileRepository {
    fn get_value(&self, key: &str) -> RepoResult<Option<String>>;
    /// Inserts or replaces one non-reserved key.
    fn set_value(&self, key: &str, value: &str) -> RepoResult<()>;
    /// Removes one non-reserved key; returns whether it existed.
    fn remove_value(&self, key: &str) -> RepoResult<bool>;
    /// Lists all pairs sorted by key, reserved keys included.
    fn list_values(&self) -> RepoResult<Vec<(String, String)>>;
}

/// SQLite-backed profile repository.
pub struct SqliteProfileRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProfileRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["profile_kv"])?;
        Ok(Self { conn })
    }
}

impl ProfileRepository for SqliteProfileRepository<'_> {
    fn get_value(&self, key: &str) -> RepoResult<Option<String>> {
        read_value(self.conn, normalize_key(key)?)
    }

    fn set_value(&self, key: &str, value: &str) -> RepoResult<()> {
        let key = writable_key(key)?;
        write_value(self.conn, key, value)
    }

    fn remove_value(&self, key: &str) -> RepoResult<bool> {
        let key = writable_key(key)?;
        let changed = self
            .conn
            .execute("DELETE FROM profile_kv WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }

    fn list_values(&self) -> RepoResult<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM profile_kv ORDER BY key ASC;")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut values = Vec::new();
        for row in rows {
            values.push(row?);
        }
        Ok(values)
    }
}

pub(crate) fn read_value(conn: &Connection, key: &str) -> RepoResult<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM profile_kv WHERE key = ?1;",
            [key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

pub(crate) fn write_value(conn: &Connection, key: &str, value: &str) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO profile_kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![key, value],
    )?;
    Ok(())
}

fn normalize_key(key: &str) -> RepoResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidData(
            "profile key must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

fn writable_key(key: &str) -> RepoResult<&str> {
    let key = normalize_key(key)?;
    if RESERVED_KEYS.contains(&key) {
        return Err(RepoError::ReservedKey(key.to_string()));
    }
    Ok(key)
}
