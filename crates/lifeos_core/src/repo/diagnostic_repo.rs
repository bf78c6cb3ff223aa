//! Simulated diagnostic panel persistence.
//!
//! # Responsibility
//! - Store classified panels so dashboards can show history.
//! - Load the latest panel and per-metric reading history.
//!
//! # Invariants
//! - A panel and all its readings are inserted in one transaction.
//! - Reading order inside a panel is preserved via `position`.

use crate::model::diagnostic::{DiagnosticDataPoint, DiagnosticDomain, DiagnosticStatus};
use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use uuid::Uuid;

/// One persisted panel.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPanel {
    pub panel_id: Uuid,
    /// Epoch milliseconds.
    pub recorded_at: i64,
    pub points: Vec<DiagnosticDataPoint>,
}

/// One persisted reading with its panel timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReading {
    pub panel_id: Uuid,
    pub recorded_at: i64,
    pub point: DiagnosticDataPoint,
}

/// Repository interface for diagnostic panels.
pub trait DiagnosticRepository {
    fn insert_panel(&mut self, panel: &StoredPanel) -> RepoResult<()>;
    /// Most recent panel by `recorded_at`, ties broken by panel id.
    fn latest_panel(&self) -> RepoResult<Option<StoredPanel>>;
    /// Readings of one metric, newest first.
    fn readings_for_metric(&self, metric_name: &str, limit: u32) -> RepoResult<Vec<StoredReading>>;
}

/// SQLite-backed diagnostic repository.
pub struct SqliteDiagnosticRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteDiagnosticRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["diagnostic_panels", "diagnostic_readings"])?;
        Ok(Self { conn })
    }
}

impl DiagnosticRepository for SqliteDiagnosticRepository<'_> {
    fn insert_panel(&mut self, panel: &StoredPanel) -> RepoResult<()> {
        let panel_id = panel.panel_id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO diagnostic_panels (panel_id, recorded_at) VALUES (?1, ?2);",
            params![panel_id.as_str(), panel.recorded_at],
        )?;
        for (position, point) in panel.points.iter().enumerate() {
            tx.execute(
                "INSERT INTO diagnostic_readings (
                    panel_id,
                    position,
                    metric_name,
                    value,
                    unit,
                    status,
                    domain
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    panel_id.as_str(),
                    position as i64,
                    point.metric_name.as_str(),
                    point.value,
                    point.unit.as_str(),
                    point.status.as_str(),
                    point.domain.as_str(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn latest_panel(&self) -> RepoResult<Option<StoredPanel>> {
        let header = self
            .conn
            .query_row(
                "SELECT panel_id, recorded_at
                 FROM diagnostic_panels
                 ORDER BY recorded_at DESC, panel_id DESC
                 LIMIT 1;",
                [],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        let Some((panel_id_text, recorded_at)) = header else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT metric_name, value, unit, status, domain
             FROM diagnostic_readings
             WHERE panel_id = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([panel_id_text.as_str()])?;
        let mut points = Vec::new();
        while let Some(row) = rows.next()? {
            points.push(parse_point(row)?);
        }

        Ok(Some(StoredPanel {
            panel_id: parse_uuid(&panel_id_text)?,
            recorded_at,
            points,
        }))
    }

    fn readings_for_metric(&self, metric_name: &str, limit: u32) -> RepoResult<Vec<StoredReading>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.metric_name, r.value, r.unit, r.status, r.domain, p.panel_id, p.recorded_at
             FROM diagnostic_readings r
             JOIN diagnostic_panels p ON p.panel_id = r.panel_id
             WHERE r.metric_name = ?1 COLLATE NOCASE
             ORDER BY p.recorded_at DESC, p.panel_id DESC
             LIMIT ?2;",
        )?;
        let mut rows = stmt.query(params![metric_name.trim(), i64::from(limit)])?;
        let mut readings = Vec::new();
        while let Some(row) = rows.next()? {
            let panel_id: String = row.get("panel_id")?;
            readings.push(StoredReading {
                panel_id: parse_uuid(&panel_id)?,
                recorded_at: row.get("recorded_at")?,
                point: parse_point(row)?,
            });
        }
        Ok(readings)
    }
}

fn parse_point(row: &Row<'_>) -> RepoResult<DiagnosticDataPoint> {
    let status_text: String = row.get("status")?;
    let status = DiagnosticStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in diagnostic_readings.status"
        ))
    })?;
    let domain_text: String = row.get("domain")?;
    let domain = DiagnosticDomain::parse(&domain_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid domain `{domain_text}` in diagnostic_readings.domain"
        ))
    })?;

    Ok(DiagnosticDataPoint {
        metric_name: row.get("metric_name")?,
        value: row.get("value")?,
        unit: row.get("unit")?,
        status,
        domain,
    })
}

fn parse_uuid(value: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{value}` in diagnostic_panels"))
    })
}
