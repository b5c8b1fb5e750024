use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::level::MAX_STARS;
use super::types::AttemptOutcome;
use crate::config::Validate;

/// Receives one record per finished attempt. The engine never reads statistics back.
pub trait StatisticsSink {
    fn record(&mut self, outcome: &AttemptOutcome);
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct LevelStatistics {
    pub level_id: u32,
    pub games_played: u32,
    pub games_won: u32,
    /// Fewest moves in a won attempt; 0 until the level is first won.
    pub best_moves: u32,
    pub best_stars: u8,
    pub total_moves: u32,
}

impl LevelStatistics {
    pub fn new(level_id: u32) -> Self {
        Self {
            level_id,
            games_played: 0,
            games_won: 0,
            best_moves: 0,
            best_stars: 0,
            total_moves: 0,
        }
    }

    /// Percentage of attempts won.
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.games_won as f64 / self.games_played as f64 * 100.0
    }

    /// Mean moves over won attempts, truncated.
    pub fn average_moves(&self) -> u32 {
        if self.games_won == 0 {
            return 0;
        }
        self.total_moves / self.games_won
    }

    fn apply(&mut self, outcome: &AttemptOutcome) {
        self.games_played += 1;
        if !outcome.won {
            return;
        }
        self.games_won += 1;
        self.total_moves += outcome.moves_used;
        if self.best_moves == 0 || outcome.moves_used < self.best_moves {
            self.best_moves = outcome.moves_used;
        }
        self.best_stars = self.best_stars.max(outcome.stars);
    }
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct AllStatistics {
    #[serde(default)]
    pub levels: BTreeMap<u32, LevelStatistics>,
}

impl AllStatistics {
    pub fn level(&self, level_id: u32) -> Option<&LevelStatistics> {
        self.levels.get(&level_id)
    }

    pub fn best_stars(&self, level_id: u32) -> u8 {
        self.level(level_id).map_or(0, |stats| stats.best_stars)
    }

    pub fn update(&mut self, outcome: &AttemptOutcome) {
        self.levels
            .entry(outcome.level_id)
            .or_insert_with(|| LevelStatistics::new(outcome.level_id))
            .apply(outcome);
    }

    pub fn total_games_played(&self) -> u32 {
        self.levels.values().map(|stats| stats.games_played).sum()
    }

    pub fn total_games_won(&self) -> u32 {
        self.levels.values().map(|stats| stats.games_won).sum()
    }

    pub fn overall_win_rate(&self) -> f64 {
        let played = self.total_games_played();
        if played == 0 {
            return 0.0;
        }
        self.total_games_won() as f64 / played as f64 * 100.0
    }

    pub fn total_stars(&self) -> u32 {
        self.levels.values().map(|stats| stats.best_stars as u32).sum()
    }
}

impl StatisticsSink for AllStatistics {
    fn record(&mut self, outcome: &AttemptOutcome) {
        self.update(outcome);
    }
}

impl Validate for AllStatistics {
    fn validate(&self) -> Result<(), String> {
        for (level_id, stats) in &self.levels {
            if stats.level_id != *level_id {
                return Err(format!(
                    "Statistics keyed by level {} belong to level {}",
                    level_id, stats.level_id
                ));
            }
            if stats.games_won > stats.games_played {
                return Err(format!(
                    "Level {}: {} wins out of {} games",
                    level_id, stats.games_won, stats.games_played
                ));
            }
            if stats.best_stars > MAX_STARS {
                return Err(format!(
                    "Level {}: best stars must be at most {}, got {}",
                    level_id, MAX_STARS, stats.best_stars
                ));
            }
        }
        Ok(())
    }
}
