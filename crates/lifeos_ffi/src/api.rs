//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Translate core errors into simple response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens its own connection and service context; no user state
//!   is cached between calls.

use chrono::NaiveDate;
use lifeos_core::db::open_db;
use lifeos_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    summarize, CompletionOutcome, DiagnosticDataPoint, DiagnosticService, LifeConfig,
    ProgressionEngine, ProgressionService, SqliteDiagnosticRepository, SqliteProgressRepository,
    UserXp,
};
use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;

const DB_FILE_NAME: &str = "lifeos_profile.sqlite3";
const DB_PATH_ENV: &str = "LIFEOS_DB_PATH";
const CONFIG_PATH_ENV: &str = "LIFEOS_CONFIG_PATH";
const DATE_FORMAT: &str = "%Y-%m-%d";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Level bar projection.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelItem {
    pub level: u32,
    pub current: u64,
    pub next_level: u64,
    /// Bar fill in `[0.0, 1.0]`.
    pub fraction: f64,
}

/// Mastery row for list and completion responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasteryItem {
    pub protocol_id: String,
    /// `novice|adept|expert|master|grandmaster`.
    pub level: String,
    pub streak: u32,
    pub xp: u64,
}

/// Response envelope for protocol completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub ok: bool,
    pub message: String,
    pub mastery: Option<MasteryItem>,
    /// `continued|already_counted|reset`.
    pub streak_outcome: Option<String>,
    pub xp_awarded: u64,
    pub level: Option<LevelItem>,
    pub leveled_up: bool,
    pub mastery_promoted: bool,
}

impl CompletionResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            mastery: None,
            streak_outcome: None,
            xp_awarded: 0,
            level: None,
            leveled_up: false,
            mastery_promoted: false,
        }
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub message: String,
}

/// Response envelope for the level bar.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelResponse {
    pub ok: bool,
    pub message: String,
    pub level: Option<LevelItem>,
}

/// Response envelope for mastery listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasteryListResponse {
    pub ok: bool,
    pub message: String,
    pub items: Vec<MasteryItem>,
}

/// One classified reading.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingItem {
    pub metric_name: String,
    pub value: f64,
    pub unit: String,
    /// `optimal|borderline|high|low`.
    pub status: String,
    pub domain: String,
}

/// Response envelope for panel simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelResponse {
    pub ok: bool,
    pub message: String,
    pub panel_id: Option<String>,
    pub items: Vec<ReadingItem>,
    /// Count of non-optimal readings.
    pub flagged: u32,
}

/// Response envelope for single-value classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyResponse {
    pub ok: bool,
    pub message: String,
    pub item: Option<ReadingItem>,
}

/// Records a protocol completion.
///
/// Input semantics:
/// - `protocol_id`: protocol slug, case-insensitive.
/// - `date`: `YYYY-MM-DD`; `None` means today in local time.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn progress_complete_protocol(protocol_id: String, date: Option<String>) -> CompletionResponse {
    let today = match resolve_date(date.as_deref()) {
        Ok(today) => today,
        Err(err) => return CompletionResponse::failure(err),
    };

    let result = with_progression_service(|service| {
        service
            .complete_protocol(protocol_id.as_str(), today)
            .map_err(|err| err.to_string())
    });

    match result {
        Ok(outcome) => to_completion_response(&outcome),
        Err(err) => {
            CompletionResponse::failure(format!("progress_complete_protocol failed: {err}"))
        }
    }
}

/// Arms the one-time streak catalyst.
///
/// # FFI contract
/// - `ok=true` with message `Catalyst already armed.` when nothing changed.
#[flutter_rust_bridge::frb(sync)]
pub fn progress_grant_catalyst() -> ActionResponse {
    match with_progression_service(|service| {
        service.grant_streak_catalyst().map_err(|err| err.to_string())
    }) {
        Ok(true) => ActionResponse {
            ok: true,
            message: "Catalyst armed.".to_string(),
        },
        Ok(false) => ActionResponse {
            ok: true,
            message: "Catalyst already armed.".to_string(),
        },
        Err(err) => ActionResponse {
            ok: false,
            message: format!("progress_grant_catalyst failed: {err}"),
        },
    }
}

/// Returns the level bar derived from stored XP.
#[flutter_rust_bridge::frb(sync)]
pub fn progress_user_xp() -> LevelResponse {
    match with_progression_service(|service| service.user_xp().map_err(|err| err.to_string())) {
        Ok(xp) => LevelResponse {
            ok: true,
            message: format!("Level {}.", xp.level),
            level: Some(to_level_item(xp)),
        },
        Err(err) => LevelResponse {
            ok: false,
            message: format!("progress_user_xp failed: {err}"),
            level: None,
        },
    }
}

/// Lists protocol masteries sorted by protocol id.
///
/// Input semantics:
/// - `date`: `YYYY-MM-DD` read date; `None` means today in local time.
///   Streaks whose last completion is before the previous day read as 0.
#[flutter_rust_bridge::frb(sync)]
pub fn progress_list_mastery(date: Option<String>) -> MasteryListResponse {
    let today = match resolve_date(date.as_deref()) {
        Ok(today) => today,
        Err(err) => {
            return MasteryListResponse {
                ok: false,
                message: err,
                items: Vec::new(),
            }
        }
    };

    match with_progression_service(|service| {
        service.list_mastery(today).map_err(|err| err.to_string())
    }) {
        Ok(masteries) => MasteryListResponse {
            ok: true,
            message: format!("Found {} protocol(s).", masteries.len()),
            items: masteries.iter().map(to_mastery_item).collect(),
        },
        Err(err) => MasteryListResponse {
            ok: false,
            message: format!("progress_list_mastery failed: {err}"),
            items: Vec::new(),
        },
    }
}

/// Simulates, classifies and stores one demo diagnostic panel.
///
/// # FFI contract
/// - Values are demo data only, never real sensor readings.
#[flutter_rust_bridge::frb(sync)]
pub fn diagnostics_simulate_panel() -> PanelResponse {
    let recorded_at = chrono::Utc::now().timestamp_millis();
    let result = with_diagnostic_service(|service| {
        service
            .simulate_panel(&mut rand::thread_rng(), recorded_at)
            .map_err(|err| err.to_string())
    });

    match result {
        Ok(panel) => {
            let summary = summarize(&panel.points);
            PanelResponse {
                ok: true,
                message: format!("Simulated {} reading(s).", panel.points.len()),
                panel_id: Some(panel.panel_id.to_string()),
                items: panel.points.iter().map(to_reading_item).collect(),
                flagged: summary.flagged() as u32,
            }
        }
        Err(err) => PanelResponse {
            ok: false,
            message: format!("diagnostics_simulate_panel failed: {err}"),
            panel_id: None,
            items: Vec::new(),
            flagged: 0,
        },
    }
}

/// Classifies one value against the configured metric bands.
#[flutter_rust_bridge::frb(sync)]
pub fn diagnostics_classify(metric_name: String, value: f64) -> ClassifyResponse {
    let result = with_diagnostic_service(|service| {
        service
            .classify_reading(metric_name.as_str(), value)
            .map_err(|err| err.to_string())
    });

    match result {
        Ok(point) => ClassifyResponse {
            ok: true,
            message: format!("Status: {}.", point.status.as_str()),
            item: Some(to_reading_item(&point)),
        },
        Err(err) => ClassifyResponse {
            ok: false,
            message: format!("diagnostics_classify failed: {err}"),
            item: None,
        },
    }
}

fn resolve_date(raw: Option<&str>) -> Result<NaiveDate, String> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map_err(|_| format!("invalid date `{value}`; expected YYYY-MM-DD")),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn resolve_config() -> Result<LifeConfig, String> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(raw) if !raw.trim().is_empty() => LifeConfig::load(raw.trim()).map_err(|err| {
            warn!("event=config_resolve module=ffi status=error");
            format!("config load failed: {err}")
        }),
        _ => Ok(LifeConfig::default()),
    }
}

fn open_connection() -> Result<Connection, String> {
    open_db(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))
}

fn with_progression_service<T>(
    f: impl FnOnce(&mut ProgressionService<SqliteProgressRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let config = resolve_config()?;
    let mut conn = open_connection()?;
    let repo = SqliteProgressRepository::try_new(&mut conn)
        .map_err(|err| format!("progress repo init failed: {err}"))?;
    let mut service = ProgressionService::new(repo, ProgressionEngine::new(config.progression));
    f(&mut service)
}

fn with_diagnostic_service<T>(
    f: impl FnOnce(&mut DiagnosticService<SqliteDiagnosticRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let config = resolve_config()?;
    let mut conn = open_connection()?;
    let repo = SqliteDiagnosticRepository::try_new(&mut conn)
        .map_err(|err| format!("diagnostic repo init failed: {err}"))?;
    let mut service = DiagnosticService::new(repo, config.diagnostics);
    f(&mut service)
}

fn to_completion_response(outcome: &CompletionOutcome) -> CompletionResponse {
    let outcome_label = match outcome.streak_outcome {
        lifeos_core::StreakOutcome::Continued => "continued",
        lifeos_core::StreakOutcome::AlreadyCounted => "already_counted",
        lifeos_core::StreakOutcome::Reset => "reset",
    };
    CompletionResponse {
        ok: true,
        message: format!("Streak {}.", outcome.mastery.streak),
        mastery: Some(to_mastery_item(&outcome.mastery)),
        streak_outcome: Some(outcome_label.to_string()),
        xp_awarded: outcome.xp_awarded,
        level: Some(to_level_item(outcome.level_after)),
        leveled_up: outcome.leveled_up(),
        mastery_promoted: outcome.mastery_promoted(),
    }
}

fn to_level_item(xp: UserXp) -> LevelItem {
    LevelItem {
        level: xp.level,
        current: xp.current,
        next_level: xp.next_level,
        fraction: xp.fraction(),
    }
}

fn to_mastery_item(mastery: &lifeos_core::ProtocolMastery) -> MasteryItem {
    MasteryItem {
        protocol_id: mastery.protocol_id.to_string(),
        level: mastery.level.as_str().to_string(),
        streak: mastery.streak,
        xp: mastery.xp,
    }
}

fn to_reading_item(point: &DiagnosticDataPoint) -> ReadingItem {
    ReadingItem {
        metric_name: point.metric_name.clone(),
        value: point.value,
        unit: point.unit.clone(),
        status: point.status.as_str().to_string(),
        domain: point.domain.as_str().to_string(),
    }
}
