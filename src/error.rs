//! Domain errors raised while turning an event log into lineup segments.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("malformed game clock: {0:?}")]
    InvalidClock(String),

    #[error("malformed score: {0:?}")]
    InvalidScore(String),

    #[error("unknown vendor format: {0:?}")]
    UnknownVendor(String),

    #[error("game has no events")]
    EmptyGame,

    /// Fewer than six lineup boundaries were found across the whole game,
    /// meaning the play-by-play carried no usable substitution data.
    #[error("no usable substitution data: only {boundaries} lineup boundaries found")]
    NoSubstitutionData { boundaries: usize },
}
