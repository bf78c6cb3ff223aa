//! Protocol mastery model.
//!
//! # Invariants
//! - `level` is a step function of `streak` and is never authoritative alone.
//! - `streak` counts consecutive calendar days; `0` means never completed.

use crate::model::journal::ProtocolId;
use serde::{Deserialize, Serialize};

/// Tiered skill label driven by streak length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryLevel {
    Novice,
    Adept,
    Expert,
    Master,
    Grandmaster,
}

impl MasteryLevel {
    /// Stable string used in storage and FFI payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Novice => "novice",
            Self::Adept => "adept",
            Self::Expert => "expert",
            Self::Master => "master",
            Self::Grandmaster => "grandmaster",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "novice" => Some(Self::Novice),
            "adept" => Some(Self::Adept),
            "expert" => Some(Self::Expert),
            "master" => Some(Self::Master),
            "grandmaster" => Some(Self::Grandmaster),
            _ => None,
        }
    }
}

/// Mastery state of one protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolMastery {
    pub protocol_id: ProtocolId,
    pub level: MasteryLevel,
    pub streak: u32,
    pub xp: u64,
}

impl ProtocolMastery {
    /// Creates the initial state for a protocol that was never completed.
    pub fn new(protocol_id: ProtocolId) -> Self {
        Self {
            protocol_id,
            level: MasteryLevel::Novice,
            streak: 0,
            xp: 0,
        }
    }
}
