//! Core domain logic for Life OS.
//! This crate is the single source of truth for progression and diagnostic
//! invariants.

pub mod config;
pub mod db;
pub mod diagnostic;
pub mod logging;
pub mod model;
pub mod progression;
pub mod repo;
pub mod service;

pub use config::{ConfigError, LifeConfig, ProgressionConfig};
pub use diagnostic::catalog::{default_catalog, find_metric};
pub use diagnostic::classify::classify;
pub use diagnostic::simulate::{
    generate_random_value, simulate_data_point, simulate_panel, summarize, PanelSummary,
};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::diagnostic::{
    BandRange, DiagnosticDataPoint, DiagnosticDomain, DiagnosticMetric, DiagnosticStatus,
    MetricValidationError,
};
pub use model::journal::{JournalEntry, ProtocolId, ProtocolIdError};
pub use model::mastery::{MasteryLevel, ProtocolMastery};
pub use model::xp::UserXp;
pub use progression::engine::{CompletionOutcome, ProgressState, ProgressionEngine};
pub use progression::levels::{level_from_xp, LevelTable};
pub use progression::streak::{
    last_completion, live_mastery, update_streak, MasteryThresholds, StreakCatalyst,
    StreakOutcome, StreakUpdate,
};
pub use repo::diagnostic_repo::{
    DiagnosticRepository, SqliteDiagnosticRepository, StoredPanel, StoredReading,
};
pub use repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
pub use repo::progress_repo::{CompletionCommit, ProgressRepository, SqliteProgressRepository};
pub use repo::{RepoError, RepoResult};
pub use service::diagnostic_service::DiagnosticService;
pub use service::progression_service::ProgressionService;
pub use service::{ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
