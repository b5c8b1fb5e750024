mod grid;
mod level;
mod progression;
mod resolver;
mod session;
mod statistics;
mod types;

pub use grid::{Grid, MatchSet};
pub use level::{star_rating, Level, LevelCatalog, LevelProvider, MAX_STARS};
pub use progression::{record_outcome, Progression, ProgressionGate};
pub use resolver::Resolver;
pub use session::Session;
pub use statistics::{AllStatistics, LevelStatistics, StatisticsSink};
pub use types::*;
