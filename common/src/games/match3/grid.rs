use std::fmt;

use super::types::{
    Cell, Gem, GemDrop, GemType, Position, ShuffleOutcome, MAX_REGENERATE_ATTEMPTS,
    MAX_SHUFFLE_ATTEMPTS, MIN_RUN_LENGTH,
};
use crate::games::session_rng::SessionRng;
use crate::log;

/// Positions taking part in at least one run, deduplicated through a bitmap sized to the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchSet {
    size: usize,
    marked: Vec<bool>,
    count: usize,
}

impl MatchSet {
    fn new(size: usize) -> Self {
        Self {
            size,
            marked: vec![false; size * size],
            count: 0,
        }
    }

    fn mark(&mut self, index: usize) {
        if !self.marked[index] {
            self.marked[index] = true;
            self.count += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.size && pos.col < self.size && self.marked[pos.index(self.size)]
    }

    /// Row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.marked
            .iter()
            .enumerate()
            .filter(|(_, marked)| **marked)
            .map(|(index, _)| Position::from_index(index, self.size))
    }
}

/// Square board of gems stored row-major in a flat vector.
///
/// Outside of a swap in progress the grid never holds a ready-made run of three, and every gem's
/// cached coordinates equal the cell it sits in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    active_types: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn generate(size: usize, active_types: usize, rng: &mut SessionRng) -> Result<Self, String> {
        Self::check_dimensions(size, active_types)?;
        let mut grid = Self {
            size,
            active_types,
            cells: vec![Cell::Empty; size * size],
        };
        grid.fill_without_runs(rng);
        Ok(grid)
    }

    /// Builds a grid from explicit rows; `None` leaves a cell empty.
    pub fn from_types(rows: &[Vec<Option<GemType>>], active_types: usize) -> Result<Self, String> {
        let size = rows.len();
        Self::check_dimensions(size, active_types)?;

        let mut cells = Vec::with_capacity(size * size);
        for (row, kinds) in rows.iter().enumerate() {
            if kinds.len() != size {
                return Err(format!(
                    "Grid must be square: row {} has {} cells, expected {}",
                    row,
                    kinds.len(),
                    size
                ));
            }
            for (col, kind) in kinds.iter().enumerate() {
                let cell = match kind {
                    Some(kind) if kind.index() >= active_types => {
                        return Err(format!(
                            "{:?} at ({}, {}) is outside the {} active gem types",
                            kind, row, col, active_types
                        ));
                    }
                    Some(kind) => Cell::Occupied(Gem::new(*kind, Position::new(row, col))),
                    None => Cell::Empty,
                };
                cells.push(cell);
            }
        }

        Ok(Self {
            size,
            active_types,
            cells,
        })
    }

    fn check_dimensions(size: usize, active_types: usize) -> Result<(), String> {
        if size == 0 {
            return Err("Grid size must be at least 1".to_string());
        }
        if active_types < 1 || active_types > GemType::COUNT {
            return Err(format!(
                "Active gem types must be between 1 and {}, got {}",
                GemType::COUNT,
                active_types
            ));
        }
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn active_types(&self) -> usize {
        self.active_types
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    pub fn get(&self, pos: Position) -> Option<&Cell> {
        if !self.contains(pos) {
            return None;
        }
        self.cells.get(pos.index(self.size))
    }

    pub fn gem_type(&self, pos: Position) -> Option<GemType> {
        self.get(pos).and_then(Cell::kind)
    }

    pub fn can_swap(&self, a: Position, b: Position) -> bool {
        self.contains(a) && self.contains(b) && a.is_adjacent(b)
    }

    /// Exchanges two cells without checking the result. Applying it twice restores the grid.
    pub fn swap(&mut self, a: Position, b: Position) -> Result<(), String> {
        if !self.contains(a) || !self.contains(b) {
            return Err(format!(
                "Swap ({}, {}) <-> ({}, {}) is outside the {}x{} grid",
                a.row, a.col, b.row, b.col, self.size, self.size
            ));
        }
        self.swap_indices(a.index(self.size), b.index(self.size));
        Ok(())
    }

    fn swap_indices(&mut self, a: usize, b: usize) {
        self.cells.swap(a, b);
        self.place(a);
        self.place(b);
    }

    fn place(&mut self, index: usize) {
        let pos = Position::from_index(index, self.size);
        if let Cell::Occupied(gem) = &mut self.cells[index] {
            gem.row = pos.row;
            gem.col = pos.col;
        }
    }

    pub fn find_matches(&self) -> MatchSet {
        let mut matches = MatchSet::new(self.size);
        for line in 0..self.size {
            self.mark_runs(&mut matches, |offset| line * self.size + offset);
            self.mark_runs(&mut matches, |offset| offset * self.size + line);
        }
        matches
    }

    /// Scans one row or column; `index_of` maps an offset along the line to a cell index.
    fn mark_runs(&self, matches: &mut MatchSet, index_of: impl Fn(usize) -> usize) {
        let mut start = 0;
        for offset in 1..=self.size {
            let continues = offset < self.size && {
                let run_kind = self.cells[index_of(start)].kind();
                run_kind.is_some() && run_kind == self.cells[index_of(offset)].kind()
            };
            if continues {
                continue;
            }
            if offset - start >= MIN_RUN_LENGTH {
                for run_offset in start..offset {
                    matches.mark(index_of(run_offset));
                }
            }
            start = offset;
        }
    }

    /// Empties every matched cell and returns the cleared positions in row-major order.
    pub fn remove(&mut self, matches: &MatchSet) -> Vec<Position> {
        let removed: Vec<Position> = matches.positions().collect();
        for pos in &removed {
            self.cells[pos.index(self.size)] = Cell::Empty;
        }
        removed
    }

    /// Lets every column settle downwards, keeping the vertical order of its gems.
    pub fn collapse(&mut self) -> Vec<GemDrop> {
        let mut drops = Vec::new();
        for col in 0..self.size {
            let mut target_row = self.size;
            for row in (0..self.size).rev() {
                let from = row * self.size + col;
                if self.cells[from].is_empty() {
                    continue;
                }
                target_row -= 1;
                if target_row != row {
                    let to = target_row * self.size + col;
                    self.cells[to] = std::mem::take(&mut self.cells[from]);
                    self.place(to);
                    drops.push(GemDrop {
                        from: Position::new(row, col),
                        to: Position::new(target_row, col),
                    });
                }
            }
        }
        drops
    }

    /// Fills empty cells column by column, top row first. Runs are allowed to form here.
    pub fn refill(&mut self, rng: &mut SessionRng) -> Vec<Position> {
        let mut added = Vec::new();
        for col in 0..self.size {
            for row in 0..self.size {
                let pos = Position::new(row, col);
                let index = pos.index(self.size);
                if self.cells[index].is_empty() {
                    let kind = GemType::random(self.active_types, rng);
                    self.cells[index] = Cell::Occupied(Gem::new(kind, pos));
                    added.push(pos);
                }
            }
        }
        added
    }

    /// First swap that would produce a match, probing each cell's right then bottom neighbour.
    pub fn find_valid_move(&self) -> Option<(Position, Position)> {
        let mut scratch = self.clone();
        for row in 0..self.size {
            for col in 0..self.size {
                let here = row * self.size + col;
                let neighbours = [
                    (col + 1 < self.size).then_some(here + 1),
                    (row + 1 < self.size).then_some(here + self.size),
                ];
                for other in neighbours.into_iter().flatten() {
                    scratch.swap_indices(here, other);
                    let productive = !scratch.find_matches().is_empty();
                    scratch.swap_indices(here, other);
                    if productive {
                        return Some((
                            Position::from_index(here, self.size),
                            Position::from_index(other, self.size),
                        ));
                    }
                }
            }
        }
        None
    }

    pub fn has_valid_moves(&self) -> bool {
        self.find_valid_move().is_some()
    }

    /// Permutes the gems until the board has no ready-made run and at least one productive swap.
    /// Falls back to fresh generation when permuting does not converge.
    pub fn shuffle_board(&mut self, rng: &mut SessionRng) -> ShuffleOutcome {
        for attempt in 1..=MAX_SHUFFLE_ATTEMPTS {
            self.permute(rng);
            if self.find_matches().is_empty() && self.has_valid_moves() {
                return ShuffleOutcome::Shuffled { attempts: attempt };
            }
        }

        log!(
            "Shuffle did not converge after {} attempts on a {}x{} grid with {} gem types, regenerating",
            MAX_SHUFFLE_ATTEMPTS,
            self.size,
            self.size,
            self.active_types
        );

        for attempt in 1..=MAX_REGENERATE_ATTEMPTS {
            self.fill_without_runs(rng);
            if self.has_valid_moves() {
                return ShuffleOutcome::Regenerated { attempts: attempt };
            }
        }

        log!(
            "No playable board after {} regenerations, keeping the last one",
            MAX_REGENERATE_ATTEMPTS
        );
        ShuffleOutcome::Regenerated {
            attempts: MAX_REGENERATE_ATTEMPTS,
        }
    }

    fn permute(&mut self, rng: &mut SessionRng) {
        let occupied: Vec<usize> = (0..self.cells.len())
            .filter(|&index| !self.cells[index].is_empty())
            .collect();
        let mut kinds: Vec<GemType> = occupied
            .iter()
            .filter_map(|&index| self.cells[index].kind())
            .collect();
        rng.shuffle(&mut kinds);
        for (&index, kind) in occupied.iter().zip(kinds) {
            self.cells[index] = Cell::Occupied(Gem::new(kind, Position::from_index(index, self.size)));
        }
    }

    /// Row-major fill that redraws any kind completing a run with the two cells to the left or
    /// the two cells above.
    fn fill_without_runs(&mut self, rng: &mut SessionRng) {
        for index in 0..self.cells.len() {
            let pos = Position::from_index(index, self.size);
            let forbidden = self.forbidden_kinds(pos);
            let allowed = (0..self.active_types)
                .filter(|&kind| !forbidden.contains(&GemType::from_index(kind)))
                .count();

            let mut kind = GemType::random(self.active_types, rng);
            // Fewer than three active kinds can leave nothing allowed.
            if allowed > 0 {
                while forbidden.contains(&Some(kind)) {
                    kind = GemType::random(self.active_types, rng);
                }
            }
            self.cells[index] = Cell::Occupied(Gem::new(kind, pos));
        }
    }

    fn forbidden_kinds(&self, pos: Position) -> [Option<GemType>; 2] {
        let pair_kind = |first: usize, second: usize| {
            let kind = self.cells[first].kind();
            if kind.is_some() && kind == self.cells[second].kind() {
                kind
            } else {
                None
            }
        };

        let index = pos.index(self.size);
        let horizontal = (pos.col >= 2)
            .then(|| pair_kind(index - 1, index - 2))
            .flatten();
        let vertical = (pos.row >= 2)
            .then(|| pair_kind(index - self.size, index - 2 * self.size))
            .flatten();
        [horizontal, vertical]
    }

    #[cfg(test)]
    pub(crate) fn from_symbols(rows: &[&str], active_types: usize) -> Self {
        let kinds: Vec<Vec<Option<GemType>>> = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|symbol| {
                        GemType::ALL
                            .iter()
                            .copied()
                            .find(|kind| kind.symbol() == symbol)
                    })
                    .collect()
            })
            .collect();
        Self::from_types(&kinds, active_types).unwrap()
    }

    #[cfg(test)]
    pub(crate) fn coordinates_consistent(&self) -> bool {
        self.cells.iter().enumerate().all(|(index, cell)| match cell {
            Cell::Occupied(gem) => gem.position() == Position::from_index(index, self.size),
            Cell::Empty => true,
        })
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            let line: String = (0..self.size)
                .map(|col| {
                    self.cells[row * self.size + col]
                        .kind()
                        .map_or('.', GemType::symbol)
                })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
