//! Domain model for progression and diagnostic projections.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep derived values (levels, mastery tiers, statuses) as closed enums.
//!
//! # Invariants
//! - Derived fields are recomputed from their sources on every read.
//! - Protocol identity is a validated, normalized slug.

pub mod diagnostic;
pub mod journal;
pub mod mastery;
pub mod xp;
