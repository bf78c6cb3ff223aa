//! Completion orchestration over levels and streaks.
//!
//! # Responsibility
//! - Apply one protocol completion to an explicit progress state.
//! - Award XP to both the protocol and the user total.
//!
//! # Invariants
//! - `AlreadyCounted` completions award no XP and change no state.
//! - Awarded XP is `xp_per_completion * increment`.

use crate::config::ProgressionConfig;
use crate::model::journal::JournalEntry;
use crate::model::mastery::{MasteryLevel, ProtocolMastery};
use crate::model::xp::UserXp;
use crate::progression::levels::LevelTable;
use crate::progression::streak::{
    update_streak, MasteryThresholds, StreakCatalyst, StreakOutcome,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Caller-owned progress context for one completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    pub total_xp: u64,
    pub mastery: ProtocolMastery,
    pub catalyst: StreakCatalyst,
}

/// Everything a completion changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionOutcome {
    pub mastery: ProtocolMastery,
    pub streak_outcome: StreakOutcome,
    pub xp_awarded: u64,
    pub total_xp: u64,
    pub level_before: UserXp,
    pub level_after: UserXp,
    pub mastery_before: MasteryLevel,
    pub catalyst_consumed: bool,
    /// Catalyst state after the completion.
    pub catalyst: StreakCatalyst,
}

impl CompletionOutcome {
    pub fn leveled_up(&self) -> bool {
        self.level_after.level > self.level_before.level
    }

    pub fn mastery_promoted(&self) -> bool {
        self.mastery.level > self.mastery_before
    }
}

/// Pure progression rules bound to one configuration.
#[derive(Debug, Clone)]
pub struct ProgressionEngine {
    levels: LevelTable,
    mastery: MasteryThresholds,
    xp_per_completion: u64,
}

impl ProgressionEngine {
    pub fn new(config: ProgressionConfig) -> Self {
        Self {
            levels: config.level_thresholds,
            mastery: config.mastery,
            xp_per_completion: config.xp_per_completion,
        }
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn mastery_thresholds(&self) -> &MasteryThresholds {
        &self.mastery
    }

    pub fn user_xp(&self, total_xp: u64) -> UserXp {
        self.levels.level_from_xp(total_xp)
    }

    /// Applies one completion of `state.mastery.protocol_id` on `today`.
    pub fn complete_protocol(
        &self,
        state: &ProgressState,
        history: &[JournalEntry],
        today: NaiveDate,
    ) -> CompletionOutcome {
        let mut catalyst = state.catalyst;
        let update = update_streak(&state.mastery, history, today, &mut catalyst, &self.mastery);

        let xp_awarded = match update.outcome {
            StreakOutcome::AlreadyCounted => 0,
            StreakOutcome::Continued | StreakOutcome::Reset => {
                self.xp_per_completion.saturating_mul(u64::from(update.increment))
            }
        };

        let mut mastery = update.mastery;
        mastery.xp = mastery.xp.saturating_add(xp_awarded);
        let total_xp = state.total_xp.saturating_add(xp_awarded);

        CompletionOutcome {
            mastery,
            streak_outcome: update.outcome,
            xp_awarded,
            total_xp,
            level_before: self.user_xp(state.total_xp),
            level_after: self.user_xp(total_xp),
            mastery_before: state.mastery.level,
            catalyst_consumed: update.catalyst_consumed,
            catalyst,
        }
    }
}

impl Default for ProgressionEngine {
    fn default() -> Self {
        Self::new(ProgressionConfig::default())
    }
}
