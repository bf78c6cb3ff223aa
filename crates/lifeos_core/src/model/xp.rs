//! User experience projection.

use serde::{Deserialize, Serialize};

/// Level progress derived from a cumulative `total_xp`.
///
/// Never stored; recomputed from `total_xp` and the level table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserXp {
    /// 1-based level number.
    pub level: u32,
    /// XP earned inside the current level.
    pub current: u64,
    /// XP span of the current level.
    pub next_level: u64,
}

impl UserXp {
    /// Progress inside the current level in `[0.0, 1.0]`.
    pub fn fraction(&self) -> f64 {
        if self.next_level == 0 {
            return 1.0;
        }
        (self.current as f64 / self.next_level as f64).clamp(0.0, 1.0)
    }

    /// Terminal state past the last threshold: the bar is full.
    pub fn is_max_level(&self) -> bool {
        self.current == self.next_level
    }
}
