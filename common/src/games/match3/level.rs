use serde::{Deserialize, Serialize};

use super::types::{GemType, MAX_GRID_SIZE, MIN_ACTIVE_TYPES, MIN_GRID_SIZE};
use crate::config::Validate;

pub const MAX_STARS: u8 = 5;

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Level {
    pub id: u32,
    pub name: String,
    pub grid_size: usize,
    pub target_score: u32,
    pub ideal_moves: u32,
    pub gem_types: usize,
}

impl Level {
    pub fn new(
        id: u32,
        name: &str,
        grid_size: usize,
        target_score: u32,
        ideal_moves: u32,
        gem_types: usize,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            grid_size,
            target_score,
            ideal_moves,
            gem_types,
        }
    }

    pub fn calculate_stars(&self, moves_used: u32) -> u8 {
        star_rating(self.ideal_moves, moves_used)
    }
}

/// Five stars at or under par, then one star less past 1.3x, 1.6x, 2x and 2.5x par.
/// Thresholds are floored, so par 7 allows 9 moves for four stars.
pub fn star_rating(ideal_moves: u32, moves_used: u32) -> u8 {
    let ideal = ideal_moves as u64;
    let used = moves_used as u64;
    let thresholds = [
        ideal,
        ideal * 13 / 10,
        ideal * 16 / 10,
        ideal * 2,
        ideal * 25 / 10,
    ];

    thresholds
        .iter()
        .position(|&limit| used <= limit)
        .map_or(0, |tier| MAX_STARS - tier as u8)
}

impl Validate for Level {
    fn validate(&self) -> Result<(), String> {
        if self.grid_size < MIN_GRID_SIZE || self.grid_size > MAX_GRID_SIZE {
            return Err(format!(
                "Level {}: grid size must be between {} and {}, got {}",
                self.id, MIN_GRID_SIZE, MAX_GRID_SIZE, self.grid_size
            ));
        }
        if self.gem_types < MIN_ACTIVE_TYPES || self.gem_types > GemType::COUNT {
            return Err(format!(
                "Level {}: gem types must be between {} and {}, got {}",
                self.id,
                MIN_ACTIVE_TYPES,
                GemType::COUNT,
                self.gem_types
            ));
        }
        if self.target_score == 0 {
            return Err(format!("Level {}: target score must be positive", self.id));
        }
        if self.ideal_moves == 0 {
            return Err(format!("Level {}: ideal moves must be positive", self.id));
        }
        Ok(())
    }
}

/// Read-only source of level definitions.
pub trait LevelProvider {
    fn level(&self, id: u32) -> Option<Level>;
    fn level_count(&self) -> usize;
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct LevelCatalog {
    pub levels: Vec<Level>,
}

impl LevelCatalog {
    pub fn built_in() -> Self {
        Self {
            levels: vec![
                Level::new(1, "Sunny Meadow", 6, 500, 12, 4),
                Level::new(2, "Crystal Cave", 6, 800, 14, 4),
                Level::new(3, "Ocean Depths", 7, 1200, 16, 5),
                Level::new(4, "Desert Storm", 7, 1500, 18, 5),
                Level::new(5, "Frozen Peaks", 7, 2000, 20, 5),
                Level::new(6, "Volcano Core", 8, 2500, 22, 6),
                Level::new(7, "Enchanted Forest", 8, 3000, 24, 6),
                Level::new(8, "Starlight Sky", 8, 3500, 26, 6),
                Level::new(9, "Dragon Lair", 9, 4000, 28, 7),
                Level::new(10, "Rainbow Kingdom", 9, 5000, 30, 7),
            ],
        }
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::built_in()
    }
}

impl Validate for LevelCatalog {
    fn validate(&self) -> Result<(), String> {
        if self.levels.is_empty() {
            return Err("Level catalog must contain at least one level".to_string());
        }
        for (position, level) in self.levels.iter().enumerate() {
            let expected = position as u32 + 1;
            if level.id != expected {
                return Err(format!(
                    "Level ids must run from 1 without gaps: expected {}, got {}",
                    expected, level.id
                ));
            }
            level.validate()?;
        }
        Ok(())
    }
}

impl LevelProvider for LevelCatalog {
    fn level(&self, id: u32) -> Option<Level> {
        self.levels.iter().find(|level| level.id == id).cloned()
    }

    fn level_count(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigSerializer, YamlConfigSerializer};

    #[test]
    fn test_star_thresholds_for_par_ten() {
        let cases = [(1, 5), (10, 5), (11, 4), (13, 4), (14, 3), (16, 3), (17, 2), (20, 2), (21, 1), (25, 1), (26, 0)];
        for (moves, stars) in cases {
            assert_eq!(star_rating(10, moves), stars, "{} moves", moves);
        }
    }

    #[test]
    fn test_star_thresholds_floor_fractional_limits() {
        // 7 * 1.3 = 9.1, 7 * 1.6 = 11.2, 7 * 2.5 = 17.5
        assert_eq!(star_rating(7, 9), 4);
        assert_eq!(star_rating(7, 10), 3);
        assert_eq!(star_rating(7, 11), 3);
        assert_eq!(star_rating(7, 12), 2);
        assert_eq!(star_rating(7, 17), 1);
        assert_eq!(star_rating(7, 18), 0);
    }

    #[test]
    fn test_level_stars_use_ideal_moves() {
        let level = Level::new(1, "Sunny Meadow", 6, 500, 12, 4);
        assert_eq!(level.calculate_stars(12), 5);
        assert_eq!(level.calculate_stars(15), 4);
        assert_eq!(level.calculate_stars(31), 0);
    }

    #[test]
    fn test_built_in_catalog_is_valid() {
        let catalog = LevelCatalog::built_in();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.level_count(), 10);
        assert_eq!(catalog.level(9).unwrap().name, "Dragon Lair");
        assert!(catalog.level(11).is_none());
    }

    #[test]
    fn test_level_validation_rejects_bad_configuration() {
        let too_few_types = Level::new(1, "Tiny", 6, 100, 5, 2);
        assert!(too_few_types.validate().is_err());

        let too_many_types = Level::new(1, "Rainbow", 6, 100, 5, 8);
        assert!(too_many_types.validate().is_err());

        let too_small = Level::new(1, "Closet", 3, 100, 5, 4);
        assert!(too_small.validate().is_err());

        let no_target = Level::new(1, "Free", 6, 0, 5, 4);
        assert!(no_target.validate().is_err());
    }

    #[test]
    fn test_catalog_rejects_gaps_in_ids() {
        let catalog = LevelCatalog {
            levels: vec![
                Level::new(1, "First", 6, 100, 5, 4),
                Level::new(3, "Third", 6, 100, 5, 4),
            ],
        };
        let err = catalog.validate().unwrap_err();
        assert!(err.contains("expected 2"));
    }

    #[test]
    fn test_catalog_parses_yaml() {
        let serializer = YamlConfigSerializer;
        let yaml = "levels:\n  - id: 1\n    name: Pond\n    grid_size: 5\n    target_score: 90\n    ideal_moves: 3\n    gem_types: 3\n";

        let catalog: LevelCatalog = serializer.deserialize(yaml).unwrap();

        assert_eq!(catalog.levels, vec![Level::new(1, "Pond", 5, 90, 3, 3)]);
        assert!(catalog.validate().is_ok());
    }
}
