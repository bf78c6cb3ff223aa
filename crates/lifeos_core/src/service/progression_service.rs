//! Protocol completion use-case service.
//!
//! # Responsibility
//! - Load progress state, run the progression engine, persist the result.
//! - Expose derived XP and mastery projections to callers.
//!
//! # Invariants
//! - Already-counted completions write nothing.
//! - Counted completions are committed atomically by the repository.
//! - Completions are appended in date order; back-dated ones are rejected.
//! - Mastery reads are projected onto the caller's `today`.

use crate::model::journal::{JournalEntry, ProtocolId};
use crate::model::mastery::ProtocolMastery;
use crate::model::xp::UserXp;
use crate::progression::engine::{CompletionOutcome, ProgressState, ProgressionEngine};
use crate::progression::streak::{last_completion, live_mastery, StreakCatalyst, StreakOutcome};
use crate::repo::progress_repo::{CompletionCommit, ProgressRepository};
use crate::service::{ServiceError, ServiceResult};
use chrono::NaiveDate;
use log::{info, warn};

/// Progression use-case facade over a progress repository.
pub struct ProgressionService<R: ProgressRepository> {
    repo: R,
    engine: ProgressionEngine,
}

impl<R: ProgressRepository> ProgressionService<R> {
    pub fn new(repo: R, engine: ProgressionEngine) -> Self {
        Self { repo, engine }
    }

    /// Records one completion of `protocol_id` on `today`.
    ///
    /// # Contract
    /// - Completing the same protocol twice on one day returns
    ///   `StreakOutcome::AlreadyCounted` and awards nothing.
    /// - A `today` earlier than the protocol's latest journal day returns
    ///   `ServiceError::CompletionBeforeLatest` and writes nothing.
    /// - Returns the full before/after projection for UI celebration flows.
    pub fn complete_protocol(
        &mut self,
        protocol_id: &str,
        today: NaiveDate,
    ) -> ServiceResult<CompletionOutcome> {
        let protocol_id = ProtocolId::parse(protocol_id)?;
        let thresholds = *self.engine.mastery_thresholds();

        let history = self.repo.history(Some(&protocol_id))?;
        let last = last_completion(&history, &protocol_id);
        if let Some(latest) = last.filter(|latest| today < *latest) {
            warn!(
                "event=protocol_complete module=service status=rejected reason=before_latest"
            );
            return Err(ServiceError::CompletionBeforeLatest {
                requested: today,
                latest,
            });
        }

        let stored = self.repo.load_mastery(&protocol_id, &thresholds)?;
        let state = ProgressState {
            total_xp: self.repo.total_xp()?,
            mastery: live_mastery(&stored, last, today, &thresholds),
            catalyst: self.repo.catalyst()?,
        };
        let outcome = self.engine.complete_protocol(&state, &history, today);

        if outcome.streak_outcome != StreakOutcome::AlreadyCounted {
            self.repo.commit_completion(&CompletionCommit {
                date: today,
                mastery: outcome.mastery.clone(),
                total_xp: outcome.total_xp,
                catalyst: outcome.catalyst,
            })?;
        }

        info!(
            "event=protocol_complete module=service status=ok outcome={:?} xp_awarded={} leveled_up={} promoted={}",
            outcome.streak_outcome,
            outcome.xp_awarded,
            outcome.leveled_up(),
            outcome.mastery_promoted()
        );
        Ok(outcome)
    }

    /// Arms the one-time streak catalyst.
    ///
    /// Returns `false` when it was already armed.
    pub fn grant_streak_catalyst(&mut self) -> ServiceResult<bool> {
        if self.repo.catalyst()?.is_armed() {
            return Ok(false);
        }
        self.repo.set_catalyst(StreakCatalyst::armed())?;
        Ok(true)
    }

    pub fn catalyst(&self) -> ServiceResult<StreakCatalyst> {
        Ok(self.repo.catalyst()?)
    }

    /// Derives level progress from the stored `total_xp`.
    pub fn user_xp(&self) -> ServiceResult<UserXp> {
        Ok(self.engine.user_xp(self.repo.total_xp()?))
    }

    /// Mastery of one protocol as of `today`; lapsed streaks read as 0.
    pub fn mastery(&self, protocol_id: &str, today: NaiveDate) -> ServiceResult<ProtocolMastery> {
        let protocol_id = ProtocolId::parse(protocol_id)?;
        let thresholds = self.engine.mastery_thresholds();
        let stored = self.repo.load_mastery(&protocol_id, thresholds)?;
        let history = self.repo.history(Some(&protocol_id))?;
        Ok(live_mastery(
            &stored,
            last_completion(&history, &protocol_id),
            today,
            thresholds,
        ))
    }

    /// Every tracked protocol as of `today`.
    pub fn list_mastery(&self, today: NaiveDate) -> ServiceResult<Vec<ProtocolMastery>> {
        let thresholds = self.engine.mastery_thresholds();
        let history = self.repo.history(None)?;
        Ok(self
            .repo
            .list_mastery(thresholds)?
            .iter()
            .map(|stored| {
                let last = last_completion(&history, &stored.protocol_id);
                live_mastery(stored, last, today, thresholds)
            })
            .collect())
    }

    /// Activity journal, optionally filtered to one protocol.
    pub fn history(&self, protocol_id: Option<&str>) -> ServiceResult<Vec<JournalEntry>> {
        let protocol_id = protocol_id.map(ProtocolId::parse).transpose()?;
        Ok(self.repo.history(protocol_id.as_ref())?)
    }
}
