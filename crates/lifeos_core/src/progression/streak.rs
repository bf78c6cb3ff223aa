//! Consecutive-day streaks and mastery tiers.
//!
//! # Responsibility
//! - Find the most recent completion of a protocol in the activity journal.
//! - Continue, keep, or reset a streak relative to `today`.
//! - Map streak length onto a mastery tier.
//! - Project a stored streak onto a read date.
//!
//! # Invariants
//! - History is expected ascending by date with unique dates. Anything else is
//!   treated as "no prior completion" and the streak resets.
//! - A streak catalyst is consumed only when a streak actually continues.
//! - A streak whose last completion is older than yesterday reads as 0.

use crate::config::ConfigError;
use crate::model::journal::{JournalEntry, ProtocolId};
use crate::model::mastery::{MasteryLevel, ProtocolMastery};
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

/// Streak day counts at which each mastery tier starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryThresholds {
    pub adept: u32,
    pub expert: u32,
    pub master: u32,
    pub grandmaster: u32,
}

impl MasteryThresholds {
    /// Checks that every boundary is `>= 1` and strictly ascending.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let steps = [self.adept, self.expert, self.master, self.grandmaster];
        if steps[0] == 0 || steps.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::InvalidMasteryThresholds(format!(
                "expected 1 <= adept < expert < master < grandmaster, got {}/{}/{}/{}",
                self.adept, self.expert, self.master, self.grandmaster
            )));
        }
        Ok(())
    }

    /// Step function from streak length to mastery tier.
    pub fn level_for_streak(&self, streak: u32) -> MasteryLevel {
        if streak >= self.grandmaster {
            MasteryLevel::Grandmaster
        } else if streak >= self.master {
            MasteryLevel::Master
        } else if streak >= self.expert {
            MasteryLevel::Expert
        } else if streak >= self.adept {
            MasteryLevel::Adept
        } else {
            MasteryLevel::Novice
        }
    }
}

impl Default for MasteryThresholds {
    fn default() -> Self {
        Self {
            adept: 3,
            expert: 7,
            master: 21,
            grandmaster: 60,
        }
    }
}

/// One-time item that doubles the next streak increment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakCatalyst {
    armed: bool,
}

impl StreakCatalyst {
    pub fn armed() -> Self {
        Self { armed: true }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Increment applied to a continuing streak.
    pub fn multiplier(&self) -> u32 {
        if self.armed {
            2
        } else {
            1
        }
    }

    fn consume(&mut self) -> bool {
        std::mem::replace(&mut self.armed, false)
    }
}

/// How a completion affected the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakOutcome {
    /// Last completion was yesterday; streak grew.
    Continued,
    /// Already completed today; nothing changed.
    AlreadyCounted,
    /// No completion yesterday; streak restarted at 1.
    Reset,
}

/// Result of [`update_streak`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakUpdate {
    pub mastery: ProtocolMastery,
    pub outcome: StreakOutcome,
    /// Increment that was applied; `0` when already counted.
    pub increment: u32,
    pub catalyst_consumed: bool,
}

/// Returns the most recent date on which `protocol_id` was completed.
///
/// Returns `None` for unsorted or duplicate-date histories.
pub fn last_completion(history: &[JournalEntry], protocol_id: &ProtocolId) -> Option<NaiveDate> {
    if !is_strictly_ascending(history) {
        warn!(
            "event=streak_history_rejected module=progression status=warn reason=unsorted entries={}",
            history.len()
        );
        return None;
    }

    history
        .iter()
        .rev()
        .find(|entry| entry.contains(protocol_id))
        .map(|entry| entry.date)
}

/// Applies one completion of `current.protocol_id` on `today`.
///
/// `history` must not yet contain today's completion unless it was already
/// recorded earlier the same day.
pub fn update_streak(
    current: &ProtocolMastery,
    history: &[JournalEntry],
    today: NaiveDate,
    catalyst: &mut StreakCatalyst,
    thresholds: &MasteryThresholds,
) -> StreakUpdate {
    let last = last_completion(history, &current.protocol_id);
    let yesterday = today.pred_opt();

    let (streak, outcome, increment, catalyst_consumed) = match last {
        Some(date) if date == today => (current.streak, StreakOutcome::AlreadyCounted, 0, false),
        Some(date) if Some(date) == yesterday => {
            let increment = catalyst.multiplier();
            let consumed = catalyst.consume();
            (
                current.streak.saturating_add(increment),
                StreakOutcome::Continued,
                increment,
                consumed,
            )
        }
        _ => (1, StreakOutcome::Reset, 1, false),
    };

    StreakUpdate {
        mastery: ProtocolMastery {
            protocol_id: current.protocol_id.clone(),
            level: thresholds.level_for_streak(streak),
            streak,
            xp: current.xp,
        },
        outcome,
        increment,
        catalyst_consumed,
    }
}

/// Projects a stored streak onto `today`.
///
/// The stored value only holds while the last completion is yesterday or
/// later. Past that the streak has lapsed and reads as 0 at the lowest tier.
pub fn live_mastery(
    stored: &ProtocolMastery,
    last: Option<NaiveDate>,
    today: NaiveDate,
    thresholds: &MasteryThresholds,
) -> ProtocolMastery {
    let live = last.is_some_and(|date| today.signed_duration_since(date).num_days() <= 1);
    let streak = if live { stored.streak } else { 0 };
    ProtocolMastery {
        protocol_id: stored.protocol_id.clone(),
        level: thresholds.level_for_streak(streak),
        streak,
        xp: stored.xp,
    }
}

fn is_strictly_ascending(history: &[JournalEntry]) -> bool {
    history.windows(2).all(|pair| pair[0].date < pair[1].date)
}

#[cfg(test)]
mod tests {
    use super::{
        last_completion, live_mastery, update_streak, MasteryThresholds, StreakCatalyst,
        StreakOutcome,
    };
    use crate::model::journal::{JournalEntry, ProtocolId};
    use crate::model::mastery::{MasteryLevel, ProtocolMastery};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).expect("valid date")
    }

    fn pid(value: &str) -> ProtocolId {
        ProtocolId::parse(value).expect("valid protocol id")
    }

    fn entry(date: NaiveDate, protocols: &[&str]) -> JournalEntry {
        let mut entry = JournalEntry::new(date);
        for protocol in protocols {
            entry.completed_protocols.insert(pid(protocol));
        }
        entry
    }

    fn mastery(streak: u32) -> ProtocolMastery {
        let mut mastery = ProtocolMastery::new(pid("meditation"));
        mastery.streak = streak;
        mastery
    }

    #[test]
    fn continues_when_last_completion_was_yesterday() {
        let history = vec![entry(day(1), &["meditation"]), entry(day(2), &["meditation"])];
        let mut catalyst = StreakCatalyst::default();

        let update = update_streak(
            &mastery(2),
            &history,
            day(3),
            &mut catalyst,
            &MasteryThresholds::default(),
        );

        assert_eq!(update.outcome, StreakOutcome::Continued);
        assert_eq!(update.mastery.streak, 3);
        assert_eq!(update.mastery.level, MasteryLevel::Adept);
        assert!(!update.catalyst_consumed);
    }

    #[test]
    fn armed_catalyst_doubles_increment_once() {
        let history = vec![entry(day(2), &["meditation"])];
        let mut catalyst = StreakCatalyst::armed();
        let thresholds = MasteryThresholds::default();

        let first = update_streak(&mastery(4), &history, day(3), &mut catalyst, &thresholds);
        assert_eq!(first.mastery.streak, 6);
        assert_eq!(first.increment, 2);
        assert!(first.catalyst_consumed);
        assert!(!catalyst.is_armed());

        let history = vec![entry(day(2), &["meditation"]), entry(day(3), &["meditation"])];
        let second = update_streak(&first.mastery, &history, day(4), &mut catalyst, &thresholds);
        assert_eq!(second.mastery.streak, 7);
        assert_eq!(second.mastery.level, MasteryLevel::Expert);
    }

    #[test]
    fn same_day_completion_is_already_counted() {
        let history = vec![entry(day(3), &["meditation"])];
        let mut catalyst = StreakCatalyst::armed();

        let update = update_streak(
            &mastery(5),
            &history,
            day(3),
            &mut catalyst,
            &MasteryThresholds::default(),
        );

        assert_eq!(update.outcome, StreakOutcome::AlreadyCounted);
        assert_eq!(update.mastery.streak, 5);
        assert!(catalyst.is_armed());
    }

    #[test]
    fn skipped_day_resets_to_one() {
        let history = vec![entry(day(1), &["meditation"])];
        let mut catalyst = StreakCatalyst::armed();

        let update = update_streak(
            &mastery(30),
            &history,
            day(3),
            &mut catalyst,
            &MasteryThresholds::default(),
        );

        assert_eq!(update.outcome, StreakOutcome::Reset);
        assert_eq!(update.mastery.streak, 1);
        assert_eq!(update.mastery.level, MasteryLevel::Novice);
        assert!(catalyst.is_armed());
    }

    #[test]
    fn other_protocols_do_not_count() {
        let history = vec![entry(day(2), &["cold_exposure"])];
        let mut catalyst = StreakCatalyst::default();

        let update = update_streak(
            &mastery(3),
            &history,
            day(3),
            &mut catalyst,
            &MasteryThresholds::default(),
        );
        assert_eq!(update.outcome, StreakOutcome::Reset);
    }

    #[test]
    fn unsorted_history_is_treated_as_no_prior_completion() {
        let history = vec![entry(day(2), &["meditation"]), entry(day(1), &["meditation"])];
        assert_eq!(last_completion(&history, &pid("meditation")), None);

        let duplicated = vec![entry(day(2), &["meditation"]), entry(day(2), &["meditation"])];
        assert_eq!(last_completion(&duplicated, &pid("meditation")), None);
    }

    #[test]
    fn last_completion_picks_most_recent_matching_day() {
        let history = vec![
            entry(day(1), &["meditation"]),
            entry(day(4), &["meditation", "journaling"]),
            entry(day(6), &["journaling"]),
        ];
        assert_eq!(last_completion(&history, &pid("meditation")), Some(day(4)));
        assert_eq!(last_completion(&[], &pid("meditation")), None);
    }

    #[test]
    fn consecutive_days_strictly_increase_streak() {
        let thresholds = MasteryThresholds::default();
        let mut catalyst = StreakCatalyst::default();
        let mut history = Vec::new();
        let mut current = mastery(0);

        for d in 1..=10 {
            let update = update_streak(&current, &history, day(d), &mut catalyst, &thresholds);
            assert_eq!(update.mastery.streak, d);
            current = update.mastery;
            history.push(entry(day(d), &["meditation"]));
        }
        assert_eq!(current.level, MasteryLevel::Expert);
    }

    #[test]
    fn live_mastery_keeps_streak_through_yesterday() {
        let thresholds = MasteryThresholds::default();
        let mut stored = mastery(7);
        stored.xp = 70;

        let today = live_mastery(&stored, Some(day(10)), day(10), &thresholds);
        assert_eq!(today.streak, 7);
        assert_eq!(today.level, MasteryLevel::Expert);

        let next_day = live_mastery(&stored, Some(day(10)), day(11), &thresholds);
        assert_eq!(next_day.streak, 7);
        assert_eq!(next_day.xp, 70);
    }

    #[test]
    fn live_mastery_lapses_after_a_missed_day() {
        let thresholds = MasteryThresholds::default();
        let mut stored = mastery(7);
        stored.xp = 70;

        let lapsed = live_mastery(&stored, Some(day(10)), day(12), &thresholds);
        assert_eq!(lapsed.streak, 0);
        assert_eq!(lapsed.level, MasteryLevel::Novice);
        assert_eq!(lapsed.xp, 70);

        let never = live_mastery(&stored, None, day(12), &thresholds);
        assert_eq!(never.streak, 0);
    }

    #[test]
    fn mastery_step_function_uses_boundaries() {
        let thresholds = MasteryThresholds::default();
        assert_eq!(thresholds.level_for_streak(0), MasteryLevel::Novice);
        assert_eq!(thresholds.level_for_streak(2), MasteryLevel::Novice);
        assert_eq!(thresholds.level_for_streak(3), MasteryLevel::Adept);
        assert_eq!(thresholds.level_for_streak(21), MasteryLevel::Master);
        assert_eq!(thresholds.level_for_streak(60), MasteryLevel::Grandmaster);
    }

    #[test]
    fn thresholds_validation_rejects_non_ascending() {
        let thresholds = MasteryThresholds {
            adept: 3,
            expert: 3,
            master: 21,
            grandmaster: 60,
        };
        assert!(thresholds.validate().is_err());
        assert!(MasteryThresholds::default().validate().is_ok());
    }
}
