use serde::{Deserialize, Serialize};

use super::statistics::StatisticsSink;
use super::types::AttemptOutcome;
use crate::config::Validate;

/// Notified when a level is won; owns its own unlock bookkeeping.
pub trait ProgressionGate {
    fn level_completed(&mut self, level_id: u32, level_count: usize);
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
pub struct Progression {
    unlocked_levels: u32,
}

impl Progression {
    pub fn unlocked_levels(&self) -> u32 {
        self.unlocked_levels
    }

    pub fn is_unlocked(&self, level_id: u32) -> bool {
        level_id >= 1 && level_id <= self.unlocked_levels
    }

    /// Unlocks the level after `current` when `current` is the furthest one reached.
    pub fn unlock_next_level(&mut self, current: u32, level_count: usize) -> bool {
        if current >= self.unlocked_levels && (current as usize) < level_count {
            self.unlocked_levels = current + 1;
            return true;
        }
        false
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self { unlocked_levels: 1 }
    }
}

impl ProgressionGate for Progression {
    fn level_completed(&mut self, level_id: u32, level_count: usize) {
        self.unlock_next_level(level_id, level_count);
    }
}

impl Validate for Progression {
    fn validate(&self) -> Result<(), String> {
        if self.unlocked_levels == 0 {
            return Err("At least one level must be unlocked".to_string());
        }
        Ok(())
    }
}

/// Pushes a finished attempt to statistics, and to the gate when it was won.
pub fn record_outcome(
    outcome: &AttemptOutcome,
    statistics: &mut impl StatisticsSink,
    gate: &mut impl ProgressionGate,
    level_count: usize,
) {
    statistics.record(outcome);
    if outcome.won {
        gate.level_completed(outcome.level_id, level_count);
    }
}
