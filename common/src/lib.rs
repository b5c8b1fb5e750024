//! Engine for the Swapix tile-matching puzzle.
//!
//! The engine owns the board, resolves cascades and tracks one level attempt at a time.
//! Everything it produces is an ordered list of [`games::match3::GameEvent`] values that a
//! front end replays at its own pace.

pub mod config;
pub mod games;
pub mod logger;
pub mod version;
