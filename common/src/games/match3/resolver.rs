use super::grid::Grid;
use super::types::{CascadeSummary, GameEvent, POINTS_PER_GEM};
use crate::games::session_rng::SessionRng;
use crate::log;

/// Drives scan, score, remove, drop, refill until the grid holds no run.
pub struct Resolver;

impl Resolver {
    /// Runs the cascade to its fixpoint, appending four events per step to `events`.
    /// A grid without runs returns an empty summary and emits nothing.
    pub fn run(grid: &mut Grid, rng: &mut SessionRng, events: &mut Vec<GameEvent>) -> CascadeSummary {
        let mut summary = CascadeSummary::default();

        loop {
            let matches = grid.find_matches();
            if matches.is_empty() {
                break;
            }

            let cleared = matches.len() as u32;
            let points = cleared * POINTS_PER_GEM;
            summary.steps += 1;
            summary.gems_cleared += cleared;
            summary.points += points;
            log!("Cascade step {}: {} gems for {} points", summary.steps, cleared, points);

            events.push(GameEvent::ScoreAdded { points });

            let positions = grid.remove(&matches);
            events.push(GameEvent::Removed { positions });

            let drops = grid.collapse();
            events.push(GameEvent::Dropped { drops });

            let positions = grid.refill(rng);
            events.push(GameEvent::Added { positions });
        }

        summary
    }
}
