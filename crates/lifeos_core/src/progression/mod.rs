//! Progression engine: leveling, streaks and mastery tiers.
//!
//! # Responsibility
//! - Convert cumulative XP into a level and within-level progress.
//! - Convert per-protocol completion history into streaks and mastery tiers.
//!
//! # Invariants
//! - All functions are pure over caller-supplied state.
//! - Malformed threshold tables are programming errors and panic.

pub mod engine;
pub mod levels;
pub mod streak;
