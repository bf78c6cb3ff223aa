//! XP threshold table and level derivation.

use crate::config::ConfigError;
use crate::model::xp::UserXp;
use serde::{Deserialize, Serialize};

/// Ascending cumulative-XP thresholds; `thresholds[0]` is always `0`.
///
/// Level `L` (1-based) starts at `thresholds[L - 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct LevelTable {
    thresholds: Vec<u64>,
}

impl LevelTable {
    /// Builds a table from trusted static configuration.
    ///
    /// # Panics
    /// Panics when the table has fewer than two entries, does not start at
    /// `0`, or is not strictly ascending.
    pub fn new(thresholds: Vec<u64>) -> Self {
        assert_thresholds(&thresholds);
        Self { thresholds }
    }

    /// Builds a table from untrusted configuration input.
    pub fn try_new(thresholds: Vec<u64>) -> Result<Self, ConfigError> {
        check_thresholds(&thresholds).map_err(ConfigError::InvalidLevelTable)?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &[u64] {
        &self.thresholds
    }

    /// Highest reachable level.
    pub fn max_level(&self) -> u32 {
        self.thresholds.len() as u32
    }

    /// Derives level progress from cumulative XP.
    pub fn level_from_xp(&self, total_xp: u64) -> UserXp {
        derive(&self.thresholds, total_xp)
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::new(vec![
            0, 100, 250, 500, 1_000, 2_000, 3_500, 5_500, 8_000, 12_000,
        ])
    }
}

impl TryFrom<Vec<u64>> for LevelTable {
    type Error = ConfigError;

    fn try_from(value: Vec<u64>) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<LevelTable> for Vec<u64> {
    fn from(value: LevelTable) -> Self {
        value.thresholds
    }
}

/// Derives level progress from a raw threshold slice.
///
/// # Panics
/// Panics on a malformed table, same as [`LevelTable::new`].
pub fn level_from_xp(thresholds: &[u64], total_xp: u64) -> UserXp {
    assert_thresholds(thresholds);
    derive(thresholds, total_xp)
}

fn derive(thresholds: &[u64], total_xp: u64) -> UserXp {
    // Count of thresholds reached; always >= 1 because thresholds[0] == 0.
    let level = thresholds.partition_point(|threshold| *threshold <= total_xp);
    let last = thresholds.len();

    if level >= last {
        let span = thresholds[last - 1] - thresholds[last - 2];
        return UserXp {
            level: last as u32,
            current: span,
            next_level: span,
        };
    }

    let floor = thresholds[level - 1];
    UserXp {
        level: level as u32,
        current: total_xp - floor,
        next_level: thresholds[level] - floor,
    }
}

fn assert_thresholds(thresholds: &[u64]) {
    if let Err(message) = check_thresholds(thresholds) {
        panic!("invalid level threshold table: {message}");
    }
}

fn check_thresholds(thresholds: &[u64]) -> Result<(), String> {
    if thresholds.len() < 2 {
        return Err(format!(
            "expected at least 2 thresholds, got {}",
            thresholds.len()
        ));
    }
    if thresholds[0] != 0 {
        return Err(format!("first threshold must be 0, got {}", thresholds[0]));
    }
    if let Some(pair) = thresholds.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(format!(
            "thresholds must be strictly ascending, found {} before {}",
            pair[0], pair[1]
        ));
    }
    Ok(())
}
