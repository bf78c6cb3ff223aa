//! Static configuration tables loaded at startup.
//!
//! # Responsibility
//! - Hold level thresholds, mastery boundaries and metric reference ranges.
//! - Load overrides from JSON and validate them before use.
//!
//! # Invariants
//! - A `LifeConfig` returned by `load`/`from_json_str` has passed `validate()`.
//! - Omitted sections fall back to built-in defaults.

use crate::diagnostic::catalog::default_catalog;
use crate::model::diagnostic::{DiagnosticMetric, MetricValidationError};
use crate::progression::levels::LevelTable;
use crate::progression::streak::MasteryThresholds;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const DEFAULT_XP_PER_COMPLETION: u64 = 10;

/// Configuration loading and validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidLevelTable(String),
    InvalidMasteryThresholds(String),
    InvalidXpReward,
    InvalidMetric(MetricValidationError),
    DuplicateMetric(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::InvalidLevelTable(message) => {
                write!(f, "invalid level threshold table: {message}")
            }
            Self::InvalidMasteryThresholds(message) => {
                write!(f, "invalid mastery thresholds: {message}")
            }
            Self::InvalidXpReward => write!(f, "xp_per_completion must be greater than 0"),
            Self::InvalidMetric(err) => write!(f, "{err}"),
            Self::DuplicateMetric(name) => write!(f, "duplicate diagnostic metric `{name}`"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::InvalidMetric(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<MetricValidationError> for ConfigError {
    fn from(value: MetricValidationError) -> Self {
        Self::InvalidMetric(value)
    }
}

fn default_xp_per_completion() -> u64 {
    DEFAULT_XP_PER_COMPLETION
}

/// Progression rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    #[serde(default)]
    pub level_thresholds: LevelTable,
    #[serde(default)]
    pub mastery: MasteryThresholds,
    #[serde(default = "default_xp_per_completion")]
    pub xp_per_completion: u64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            level_thresholds: LevelTable::default(),
            mastery: MasteryThresholds::default(),
            xp_per_completion: DEFAULT_XP_PER_COMPLETION,
        }
    }
}

impl ProgressionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mastery.validate()?;
        if self.xp_per_completion == 0 {
            return Err(ConfigError::InvalidXpReward);
        }
        Ok(())
    }
}

/// Full application rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeConfig {
    #[serde(default)]
    pub progression: ProgressionConfig,
    #[serde(default = "default_catalog")]
    pub diagnostics: Vec<DiagnosticMetric>,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            progression: ProgressionConfig::default(),
            diagnostics: default_catalog(),
        }
    }
}

impl LifeConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    ///
    /// # Side effects
    /// - Emits `config_load` events with status only; never file content.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let result = std::fs::read_to_string(path.as_ref())
            .map_err(ConfigError::from)
            .and_then(|raw| Self::from_json_str(&raw));
        match &result {
            Ok(config) => info!(
                "event=config_load module=config status=ok metrics={} levels={}",
                config.diagnostics.len(),
                config.progression.level_thresholds.max_level()
            ),
            Err(err) => error!(
                "event=config_load module=config status=error error={}",
                err
            ),
        }
        result
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.progression.validate()?;
        let mut names = BTreeSet::new();
        for metric in &self.diagnostics {
            metric.validate()?;
            if !names.insert(metric.name.to_ascii_lowercase()) {
                return Err(ConfigError::DuplicateMetric(metric.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, LifeConfig};
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config = LifeConfig::from_json_str("{}").expect("defaults should validate");
        assert_eq!(config, LifeConfig::default());
        assert!(!config.diagnostics.is_empty());
    }

    #[test]
    fn partial_progression_override_keeps_other_defaults() {
        let config = LifeConfig::from_json_str(
            r#"{ "progression": { "level_thresholds": [0, 10, 30], "xp_per_completion": 5 } }"#,
        )
        .unwrap();
        assert_eq!(config.progression.level_thresholds.thresholds(), &[0, 10, 30]);
        assert_eq!(config.progression.xp_per_completion, 5);
        assert_eq!(config.progression.mastery.adept, 3);
    }

    #[test]
    fn invalid_level_table_is_a_parse_error() {
        let err = LifeConfig::from_json_str(r#"{ "progression": { "level_thresholds": [] } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("at least 2 thresholds"), "{err}");
    }

    #[test]
    fn zero_xp_reward_is_rejected() {
        let err = LifeConfig::from_json_str(r#"{ "progression": { "xp_per_completion": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidXpReward));
    }

    #[test]
    fn duplicate_metric_names_are_rejected() {
        let metric = r#"{ "name": "HRV", "unit": "ms", "domain": "recovery",
                          "optimal_range": { "low": 60.0, "high": 100.0 } }"#;
        let raw = format!(r#"{{ "diagnostics": [{metric}, {metric}] }}"#);
        let err = LifeConfig::from_json_str(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateMetric(name) if name == "HRV"));
    }

    #[test]
    fn load_reads_file_and_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("life.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{ "progression": { "xp_per_completion": 15 } }"#)
            .unwrap();
        drop(file);

        let config = LifeConfig::load(&path).unwrap();
        assert_eq!(config.progression.xp_per_completion, 15);

        let err = LifeConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
