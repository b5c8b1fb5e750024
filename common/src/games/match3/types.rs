use serde::{Deserialize, Serialize};

use crate::games::session_rng::SessionRng;

pub const POINTS_PER_GEM: u32 = 10;
pub const MIN_RUN_LENGTH: usize = 3;

pub const MIN_GRID_SIZE: usize = 4;
pub const MAX_GRID_SIZE: usize = 12;
pub const MIN_ACTIVE_TYPES: usize = 3;

pub const MAX_SHUFFLE_ATTEMPTS: u32 = 100;
pub const MAX_REGENERATE_ATTEMPTS: u32 = 100;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum GemType {
    Ruby,
    Sapphire,
    Emerald,
    Topaz,
    Amethyst,
    Diamond,
    Obsidian,
}

impl GemType {
    pub const ALL: [GemType; 7] = [
        GemType::Ruby,
        GemType::Sapphire,
        GemType::Emerald,
        GemType::Topaz,
        GemType::Amethyst,
        GemType::Diamond,
        GemType::Obsidian,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn from_index(index: usize) -> Option<GemType> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Uniform draw from the first `active` kinds.
    pub fn random(active: usize, rng: &mut SessionRng) -> GemType {
        let available = active.clamp(1, Self::COUNT);
        Self::ALL[rng.random_range(0..available)]
    }

    pub fn symbol(self) -> char {
        match self {
            GemType::Ruby => 'R',
            GemType::Sapphire => 'S',
            GemType::Emerald => 'E',
            GemType::Topaz => 'T',
            GemType::Amethyst => 'A',
            GemType::Diamond => 'D',
            GemType::Obsidian => 'O',
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn index(self, size: usize) -> usize {
        self.row * size + self.col
    }

    pub fn from_index(index: usize, size: usize) -> Self {
        Self {
            row: index / size,
            col: index % size,
        }
    }

    /// 4-neighbourhood only; diagonals and the cell itself are not adjacent.
    pub fn is_adjacent(self, other: Position) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

/// A gem together with the coordinates it was last placed at.
///
/// The grid rewrites `row`/`col` whenever it moves a gem, so equality compares kind and position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Gem {
    pub kind: GemType,
    pub row: usize,
    pub col: usize,
}

impl Gem {
    pub fn new(kind: GemType, pos: Position) -> Self {
        Self {
            kind,
            row: pos.row,
            col: pos.col,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Gem),
}

impl Cell {
    pub fn gem(&self) -> Option<&Gem> {
        match self {
            Cell::Occupied(gem) => Some(gem),
            Cell::Empty => None,
        }
    }

    pub fn kind(&self) -> Option<GemType> {
        self.gem().map(|gem| gem.kind)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GemDrop {
    pub from: Position,
    pub to: Position,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameStatus {
    Playing,
    Won,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionPhase {
    Idle,
    Resolving,
    Won,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct CascadeSummary {
    pub steps: u32,
    pub gems_cleared: u32,
    pub points: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SwapOutcome {
    Reverted,
    Resolved(CascadeSummary),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Selection {
    Selected(Position),
    Cleared,
    Swapped(SwapOutcome),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShuffleOutcome {
    Shuffled { attempts: u32 },
    Regenerated { attempts: u32 },
}

/// Result of one finished attempt, as handed to statistics and progression.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AttemptOutcome {
    pub level_id: u32,
    pub won: bool,
    pub moves_used: u32,
    pub stars: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Swapped { from: Position, to: Position },
    Reverted { from: Position, to: Position },
    ScoreAdded { points: u32 },
    Removed { positions: Vec<Position> },
    Dropped { drops: Vec<GemDrop> },
    Added { positions: Vec<Position> },
    Shuffled,
    Finished { won: bool, moves_used: u32, stars: u8 },
}
