use super::grid::Grid;
use super::level::Level;
use super::resolver::Resolver;
use super::types::{
    AttemptOutcome, Cell, GameEvent, GameStatus, Position, Selection, SessionPhase, SwapOutcome,
};
use crate::config::Validate;
use crate::games::session_rng::SessionRng;
use crate::log;

/// One attempt at one level.
///
/// Every public call either applies fully or leaves the session untouched. Events describing
/// what changed are queued in order and drained with [`Session::take_events`].
pub struct Session {
    level: Level,
    grid: Grid,
    rng: SessionRng,
    score: u32,
    moves_used: u32,
    phase: SessionPhase,
    selected: Option<Position>,
    pending_events: Vec<GameEvent>,
}

impl Session {
    pub fn new(level: Level, mut rng: SessionRng) -> Result<Self, String> {
        level.validate()?;
        let grid = Grid::generate(level.grid_size, level.gem_types, &mut rng)?;
        Ok(Self::start(level, grid, rng))
    }

    /// Starts from a prepared grid, which must fit the level and hold no run already.
    pub fn from_grid(level: Level, grid: Grid, rng: SessionRng) -> Result<Self, String> {
        level.validate()?;
        if grid.size() != level.grid_size || grid.active_types() != level.gem_types {
            return Err(format!(
                "Grid is {}x{} with {} gem types, level {} expects {}x{} with {}",
                grid.size(),
                grid.size(),
                grid.active_types(),
                level.id,
                level.grid_size,
                level.grid_size,
                level.gem_types
            ));
        }
        if grid.cells().iter().any(Cell::is_empty) {
            return Err("Starting grid has empty cells".to_string());
        }
        if !grid.find_matches().is_empty() {
            return Err("Starting grid already contains a match".to_string());
        }
        Ok(Self::start(level, grid, rng))
    }

    fn start(level: Level, grid: Grid, rng: SessionRng) -> Self {
        log!(
            "Level {} ({}) started with seed {}",
            level.id,
            level.name,
            rng.seed()
        );
        let mut session = Self {
            level,
            grid,
            rng,
            score: 0,
            moves_used: 0,
            phase: SessionPhase::Idle,
            selected: None,
            pending_events: Vec::new(),
        };
        session.ensure_playable();
        session
    }

    /// Two-tap input: the first tap selects, a tap on a neighbour swaps, any other tap clears.
    pub fn select(&mut self, pos: Position) -> Result<Selection, String> {
        self.ensure_idle()?;
        if !self.grid.contains(pos) {
            return Err(format!("({}, {}) is outside the grid", pos.row, pos.col));
        }

        match self.selected.take() {
            None => {
                self.selected = Some(pos);
                Ok(Selection::Selected(pos))
            }
            Some(first) if first.is_adjacent(pos) => self.swap(first, pos).map(Selection::Swapped),
            Some(_) => Ok(Selection::Cleared),
        }
    }

    pub fn swap(&mut self, a: Position, b: Position) -> Result<SwapOutcome, String> {
        self.ensure_idle()?;
        if !self.grid.can_swap(a, b) {
            return Err(format!(
                "Cannot swap ({}, {}) with ({}, {}): cells must be neighbours",
                a.row, a.col, b.row, b.col
            ));
        }

        self.selected = None;
        self.grid.swap(a, b)?;
        self.pending_events.push(GameEvent::Swapped { from: a, to: b });

        if self.grid.find_matches().is_empty() {
            self.grid.swap(a, b)?;
            self.pending_events.push(GameEvent::Reverted { from: a, to: b });
            return Ok(SwapOutcome::Reverted);
        }

        self.moves_used += 1;
        self.phase = SessionPhase::Resolving;

        let summary = Resolver::run(&mut self.grid, &mut self.rng, &mut self.pending_events);
        self.score += summary.points;

        self.finish_turn();
        Ok(SwapOutcome::Resolved(summary))
    }

    fn finish_turn(&mut self) {
        if self.score >= self.level.target_score {
            self.phase = SessionPhase::Won;
            let stars = self.level.calculate_stars(self.moves_used);
            log!(
                "Level {} won with {} points in {} moves ({} stars)",
                self.level.id,
                self.score,
                self.moves_used,
                stars
            );
            self.pending_events.push(GameEvent::Finished {
                won: true,
                moves_used: self.moves_used,
                stars,
            });
            return;
        }

        self.ensure_playable();
        self.phase = SessionPhase::Idle;
    }

    fn ensure_playable(&mut self) {
        if self.grid.has_valid_moves() {
            return;
        }
        let outcome = self.grid.shuffle_board(&mut self.rng);
        log!("No moves left on level {}: {:?}", self.level.id, outcome);
        self.pending_events.push(GameEvent::Shuffled);
    }

    fn ensure_idle(&self) -> Result<(), String> {
        match self.phase {
            SessionPhase::Idle => Ok(()),
            SessionPhase::Resolving => Err("A swap is still being resolved".to_string()),
            SessionPhase::Won => Err("Level is already won".to_string()),
        }
    }

    /// Loss record for the statistics sink. Grid, score and phase stay as they are.
    pub fn give_up(&self) -> Result<AttemptOutcome, String> {
        self.ensure_idle()?;
        log!("Level {} abandoned after {} moves", self.level.id, self.moves_used);
        Ok(AttemptOutcome {
            level_id: self.level.id,
            won: false,
            moves_used: self.moves_used,
            stars: 0,
        })
    }

    pub fn outcome(&self) -> Option<AttemptOutcome> {
        (self.phase == SessionPhase::Won).then(|| AttemptOutcome {
            level_id: self.level.id,
            won: true,
            moves_used: self.moves_used,
            stars: self.level.calculate_stars(self.moves_used),
        })
    }

    pub fn hint(&self) -> Option<(Position, Position)> {
        if self.phase != SessionPhase::Idle {
            return None;
        }
        self.grid.find_valid_move()
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn status(&self) -> GameStatus {
        match self.phase {
            SessionPhase::Won => GameStatus::Won,
            SessionPhase::Idle | SessionPhase::Resolving => GameStatus::Playing,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves_used(&self) -> u32 {
        self.moves_used
    }

    pub fn target_score(&self) -> u32 {
        self.level.target_score
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(target_score: u32) -> Level {
        Level::new(1, "Test Garden", 4, target_score, 10, 5)
    }

    fn playable_grid() -> Grid {
        #[rustfmt::skip]
        let grid = Grid::from_symbols(&[
            "RRSE",
            "SERR",
            "TSEA",
            "ATST",
        ], 5);
        grid
    }

    fn deadlocked_grid() -> Grid {
        #[rustfmt::skip]
        let grid = Grid::from_symbols(&[
            "RSET",
            "ETRS",
            "RSET",
            "ETRS",
        ], 5);
        grid
    }

    fn session(target_score: u32) -> Session {
        Session::from_grid(level(target_score), playable_grid(), SessionRng::new(3)).unwrap()
    }

    fn count_shuffles(events: &[GameEvent]) -> usize {
        events.iter().filter(|event| **event == GameEvent::Shuffled).count()
    }

    #[test]
    fn test_new_rejects_invalid_level() {
        let bad = Level::new(1, "Broken", 6, 500, 12, 1);
        assert!(Session::new(bad, SessionRng::new(1)).is_err());

        let too_big = Level::new(1, "Huge", 40, 500, 12, 4);
        assert!(Session::new(too_big, SessionRng::new(1)).is_err());
    }

    #[test]
    fn test_from_grid_rejects_mismatched_grid() {
        let other_level = Level::new(1, "Wide", 6, 500, 12, 5);
        assert!(Session::from_grid(other_level, playable_grid(), SessionRng::new(1)).is_err());

        #[rustfmt::skip]
        let matched = Grid::from_symbols(&[
            "RRRE",
            "SERS",
            "TSEA",
            "ATST",
        ], 5);
        assert!(Session::from_grid(level(100), matched, SessionRng::new(1)).is_err());
    }

    #[test]
    fn test_new_session_starts_idle_and_playable() {
        for seed in 0..50u64 {
            let level = Level::new(3, "Ocean Depths", 7, 1200, 16, 5);
            let session = Session::new(level, SessionRng::new(seed)).unwrap();
            assert_eq!(session.phase(), SessionPhase::Idle);
            assert_eq!(session.status(), GameStatus::Playing);
            assert_eq!(session.score(), 0);
            assert_eq!(session.moves_used(), 0);
            assert!(session.grid().find_matches().is_empty());
            assert!(session.hint().is_some());
        }
    }

    #[test]
    fn test_unproductive_swap_is_free() {
        let mut session = session(10_000);
        let before = session.grid().clone();

        let outcome = session
            .swap(Position::new(3, 0), Position::new(3, 1))
            .unwrap();

        assert_eq!(outcome, SwapOutcome::Reverted);
        assert_eq!(session.moves_used(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.grid(), &before);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(
            session.take_events(),
            vec![
                GameEvent::Swapped { from: Position::new(3, 0), to: Position::new(3, 1) },
                GameEvent::Reverted { from: Position::new(3, 0), to: Position::new(3, 1) },
            ]
        );
    }

    #[test]
    fn test_productive_swap_costs_one_move() {
        let mut session = session(10_000);

        let outcome = session
            .swap(Position::new(0, 2), Position::new(1, 2))
            .unwrap();

        let SwapOutcome::Resolved(summary) = outcome else {
            panic!("Expected the swap to resolve, got {:?}", outcome);
        };
        assert_eq!(session.moves_used(), 1);
        assert_eq!(session.score(), summary.points);
        assert!(summary.points >= 30);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.grid().find_matches().is_empty());

        let events = session.take_events();
        assert_eq!(
            events[0],
            GameEvent::Swapped { from: Position::new(0, 2), to: Position::new(1, 2) }
        );
        assert_eq!(events[1], GameEvent::ScoreAdded { points: 30 });
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn test_fuzz_move_accounting_ignores_cascade_length() {
        for seed in 0..100u64 {
            let level = Level::new(1, "Sunny Meadow", 6, 1_000_000, 12, 4);
            let mut session = Session::new(level, SessionRng::new(seed)).unwrap();
            session.take_events();

            for turn in 1..=5u32 {
                let (a, b) = session.hint().unwrap();
                let SwapOutcome::Resolved(summary) = session.swap(a, b).unwrap() else {
                    panic!("Seed {}: hinted swap was reverted", seed);
                };
                assert!(summary.steps >= 1);
                assert_eq!(session.moves_used(), turn, "Seed {}", seed);
                assert!(session.grid().find_matches().is_empty());
                assert!(session.grid().has_valid_moves());
            }

            let scored: u32 = session
                .take_events()
                .iter()
                .filter_map(|event| match event {
                    GameEvent::ScoreAdded { points } => Some(*points),
                    _ => None,
                })
                .sum();
            assert_eq!(scored, session.score());
        }
    }

    #[test]
    fn test_non_adjacent_swap_is_rejected_without_side_effects() {
        let mut session = session(10_000);
        let before = session.grid().clone();

        assert!(session.swap(Position::new(0, 0), Position::new(1, 1)).is_err());
        assert!(session.swap(Position::new(0, 0), Position::new(0, 2)).is_err());
        assert!(session.swap(Position::new(3, 3), Position::new(3, 4)).is_err());

        assert_eq!(session.grid(), &before);
        assert_eq!(session.moves_used(), 0);
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn test_input_ignored_while_resolving() {
        let mut session = session(10_000);
        session.phase = SessionPhase::Resolving;

        assert!(session.swap(Position::new(0, 2), Position::new(1, 2)).is_err());
        assert!(session.select(Position::new(0, 2)).is_err());
        assert!(session.give_up().is_err());
        assert!(session.hint().is_none());
        assert_eq!(session.moves_used(), 0);
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn test_reaching_target_wins_after_cascade() {
        let mut session = session(30);

        session
            .swap(Position::new(0, 2), Position::new(1, 2))
            .unwrap();

        assert_eq!(session.status(), GameStatus::Won);
        assert_eq!(session.phase(), SessionPhase::Won);
        let events = session.take_events();
        assert_eq!(
            events.last(),
            Some(&GameEvent::Finished { won: true, moves_used: 1, stars: 5 })
        );
        assert_eq!(count_shuffles(&events), 0);
        assert_eq!(
            session.outcome(),
            Some(AttemptOutcome { level_id: 1, won: true, moves_used: 1, stars: 5 })
        );

        assert!(session.swap(Position::new(3, 0), Position::new(3, 1)).is_err());
        assert!(session.give_up().is_err());
    }

    #[test]
    fn test_outcome_absent_while_playing() {
        let session = session(10_000);
        assert!(session.outcome().is_none());
    }

    #[test]
    fn test_deadlocked_start_reshuffles_once() {
        let mut session =
            Session::from_grid(level(10_000), deadlocked_grid(), SessionRng::new(8)).unwrap();

        assert_eq!(count_shuffles(&session.take_events()), 1);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.grid().find_matches().is_empty());
        assert!(session.grid().has_valid_moves());
        assert_eq!(session.moves_used(), 0);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_deadlock_after_cascade_reshuffles_once() {
        let mut session = session(10_000);
        session.take_events();
        session.grid = deadlocked_grid();
        session.phase = SessionPhase::Resolving;

        session.finish_turn();

        let events = session.take_events();
        assert_eq!(events, vec![GameEvent::Shuffled]);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.grid().find_matches().is_empty());
        assert!(session.grid().has_valid_moves());
        assert_eq!(session.moves_used(), 0);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_select_flow() {
        let mut session = session(10_000);

        assert_eq!(
            session.select(Position::new(0, 0)).unwrap(),
            Selection::Selected(Position::new(0, 0))
        );
        assert_eq!(session.select(Position::new(2, 2)).unwrap(), Selection::Cleared);
        assert_eq!(session.selected(), None);
        assert!(session.take_events().is_empty());

        session.select(Position::new(0, 2)).unwrap();
        let selection = session.select(Position::new(1, 2)).unwrap();

        assert!(matches!(selection, Selection::Swapped(SwapOutcome::Resolved(_))));
        assert_eq!(session.moves_used(), 1);
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_select_same_cell_twice_clears() {
        let mut session = session(10_000);
        session.select(Position::new(1, 1)).unwrap();
        assert_eq!(session.select(Position::new(1, 1)).unwrap(), Selection::Cleared);
        assert!(session.select(Position::new(9, 9)).is_err());
    }

    #[test]
    fn test_give_up_reports_loss_without_touching_grid() {
        let mut session = session(10_000);
        session
            .swap(Position::new(0, 2), Position::new(1, 2))
            .unwrap();
        let grid = session.grid().clone();
        let score = session.score();

        let outcome = session.give_up().unwrap();

        assert_eq!(
            outcome,
            AttemptOutcome { level_id: 1, won: false, moves_used: 1, stars: 0 }
        );
        assert_eq!(session.grid(), &grid);
        assert_eq!(session.score(), score);
        assert_eq!(session.status(), GameStatus::Playing);
    }

    #[test]
    fn test_same_seed_same_events() {
        let level = Level::new(4, "Desert Storm", 7, 1500, 18, 5);
        let mut first = Session::new(level.clone(), SessionRng::new(99)).unwrap();
        let mut second = Session::new(level, SessionRng::new(99)).unwrap();

        for _ in 0..3 {
            let (a, b) = first.hint().unwrap();
            first.swap(a, b).unwrap();
            second.swap(a, b).unwrap();
        }

        assert_eq!(first.take_events(), second.take_events());
        assert_eq!(first.grid(), second.grid());
        assert_eq!(first.score(), second.score());
    }
}
