//! Activity journal, protocol mastery and XP persistence.
//!
//! # Responsibility
//! - Load the progress state the engine needs for one completion.
//! - Commit a completion (journal row, mastery, XP, catalyst) atomically.
//!
//! # Invariants
//! - Journal history is returned ascending by date with one entry per day.
//! - Mastery level is never stored; it is derived from the streak on read.
//! - `commit_completion` writes all four pieces in one transaction or none.

use crate::model::journal::{JournalEntry, ProtocolId};
use crate::model::mastery::ProtocolMastery;
use crate::progression::streak::{MasteryThresholds, StreakCatalyst};
use crate::repo::profile_repo::{
    read_value, write_value, PROFILE_KEY_STREAK_CATALYST, PROFILE_KEY_TOTAL_XP,
};
use crate::repo::{ensure_tables, u64_from_db, u64_to_db, RepoError, RepoResult};
use chrono::NaiveDate;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::BTreeSet;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// State to persist after one counted completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCommit {
    pub date: NaiveDate,
    pub mastery: ProtocolMastery,
    pub total_xp: u64,
    pub catalyst: StreakCatalyst,
}

/// Repository interface for progression state.
pub trait ProgressRepository {
    /// Journal entries ascending by date, optionally limited to one protocol.
    fn history(&self, protocol_id: Option<&ProtocolId>) -> RepoResult<Vec<JournalEntry>>;
    /// Stored mastery, or the initial state when never completed.
    ///
    /// The streak is the value as of the last completion, not as of today.
    fn load_mastery(
        &self,
        protocol_id: &ProtocolId,
        thresholds: &MasteryThresholds,
    ) -> RepoResult<ProtocolMastery>;
    /// All stored masteries sorted by protocol id.
    fn list_mastery(&self, thresholds: &MasteryThresholds) -> RepoResult<Vec<ProtocolMastery>>;
    fn total_xp(&self) -> RepoResult<u64>;
    fn catalyst(&self) -> RepoResult<StreakCatalyst>;
    fn set_catalyst(&mut self, catalyst: StreakCatalyst) -> RepoResult<()>;
    fn commit_completion(&mut self, commit: &CompletionCommit) -> RepoResult<()>;
}

/// SQLite-backed progress repository.
pub struct SqliteProgressRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteProgressRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["profile_kv", "journal_entries", "protocol_mastery"])?;
        Ok(Self { conn })
    }
}

impl ProgressRepository for SqliteProgressRepository<'_> {
    fn history(&self, protocol_id: Option<&ProtocolId>) -> RepoResult<Vec<JournalEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT entry_date, protocol_id
             FROM journal_entries
             WHERE (?1 IS NULL OR protocol_id = ?1)
             ORDER BY entry_date ASC, protocol_id ASC;",
        )?;
        let mut rows = stmt.query([protocol_id.map(ProtocolId::as_str)])?;

        let mut entries: Vec<JournalEntry> = Vec::new();
        while let Some(row) = rows.next()? {
            let date = parse_date(&row.get::<_, String>(0)?)?;
            let protocol = parse_protocol_id(&row.get::<_, String>(1)?)?;
            match entries.last_mut() {
                Some(entry) if entry.date == date => {
                    entry.completed_protocols.insert(protocol);
                }
                _ => entries.push(JournalEntry {
                    date,
                    completed_protocols: BTreeSet::from([protocol]),
                }),
            }
        }
        Ok(entries)
    }

    fn load_mastery(
        &self,
        protocol_id: &ProtocolId,
        thresholds: &MasteryThresholds,
    ) -> RepoResult<ProtocolMastery> {
        let stored = self
            .conn
            .query_row(
                "SELECT protocol_id, streak, xp FROM protocol_mastery WHERE protocol_id = ?1;",
                [protocol_id.as_str()],
                read_mastery_columns,
            )
            .optional()?;

        match stored {
            Some(columns) => parse_mastery(columns, thresholds),
            None => Ok(ProtocolMastery::new(protocol_id.clone())),
        }
    }

    fn list_mastery(&self, thresholds: &MasteryThresholds) -> RepoResult<Vec<ProtocolMastery>> {
        let mut stmt = self.conn.prepare(
            "SELECT protocol_id, streak, xp FROM protocol_mastery ORDER BY protocol_id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut masteries = Vec::new();
        while let Some(row) = rows.next()? {
            masteries.push(parse_mastery(read_mastery_columns(row)?, thresholds)?);
        }
        Ok(masteries)
    }

    fn total_xp(&self) -> RepoResult<u64> {
        match read_value(&*self.conn, PROFILE_KEY_TOTAL_XP)? {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                RepoError::InvalidData(format!("invalid total_xp value `{raw}` in profile_kv"))
            }),
            None => Ok(0),
        }
    }

    fn catalyst(&self) -> RepoResult<StreakCatalyst> {
        match read_value(&*self.conn, PROFILE_KEY_STREAK_CATALYST)?.as_deref() {
            None | Some("0") => Ok(StreakCatalyst::default()),
            Some("1") => Ok(StreakCatalyst::armed()),
            Some(other) => Err(RepoError::InvalidData(format!(
                "invalid streak_catalyst value `{other}` in profile_kv"
            ))),
        }
    }

    fn set_catalyst(&mut self, catalyst: StreakCatalyst) -> RepoResult<()> {
        write_value(
            self.conn,
            PROFILE_KEY_STREAK_CATALYST,
            catalyst_to_db(catalyst),
        )
    }

    fn commit_completion(&mut self, commit: &CompletionCommit) -> RepoResult<()> {
        let streak = i64::from(commit.mastery.streak);
        let xp = u64_to_db(commit.mastery.xp, "protocol_mastery.xp")?;
        u64_to_db(commit.total_xp, "total_xp")?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT OR IGNORE INTO journal_entries (entry_date, protocol_id) VALUES (?1, ?2);",
            params![
                commit.date.format(DATE_FORMAT).to_string(),
                commit.mastery.protocol_id.as_str()
            ],
        )?;
        tx.execute(
            "INSERT INTO protocol_mastery (protocol_id, streak, xp) VALUES (?1, ?2, ?3)
             ON CONFLICT(protocol_id) DO UPDATE SET
                streak = excluded.streak,
                xp = excluded.xp,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![commit.mastery.protocol_id.as_str(), streak, xp],
        )?;
        write_value(&tx, PROFILE_KEY_TOTAL_XP, &commit.total_xp.to_string())?;
        write_value(&tx, PROFILE_KEY_STREAK_CATALYST, catalyst_to_db(commit.catalyst))?;

        tx.commit()?;
        info!(
            "event=completion_commit module=repo status=ok streak={} total_xp={}",
            commit.mastery.streak, commit.total_xp
        );
        Ok(())
    }
}

type MasteryColumns = (String, i64, i64);

fn read_mastery_columns(row: &Row<'_>) -> rusqlite::Result<MasteryColumns> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn parse_mastery(
    (protocol_id, streak, xp): MasteryColumns,
    thresholds: &MasteryThresholds,
) -> RepoResult<ProtocolMastery> {
    let protocol_id = parse_protocol_id(&protocol_id)?;
    let streak = u32::try_from(streak).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid streak `{streak}` in protocol_mastery.streak"
        ))
    })?;
    Ok(ProtocolMastery {
        protocol_id,
        level: thresholds.level_for_streak(streak),
        streak,
        xp: u64_from_db(xp, "protocol_mastery.xp")?,
    })
}

fn parse_date(value: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date `{value}` in journal_entries.entry_date"
        ))
    })
}

fn parse_protocol_id(value: &str) -> RepoResult<ProtocolId> {
    ProtocolId::parse(value).map_err(|err| RepoError::InvalidData(err.to_string()))
}

fn catalyst_to_db(catalyst: StreakCatalyst) -> &'static str {
    if catalyst.is_armed() {
        "1"
    } else {
        "0"
    }
}
