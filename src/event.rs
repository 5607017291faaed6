//! Normalized play-by-play events.
//!
//! Vendor adapters produce these; everything downstream of this module is
//! format-agnostic apart from the [`Vocabulary`](crate::vocab::Vocabulary)
//! used to read the free-text details.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GameError;

/// Game clock reading, stored as seconds remaining in the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameClock(u32);

impl GameClock {
    pub const ZERO: GameClock = GameClock(0);

    pub fn from_seconds(seconds: u32) -> Self {
        GameClock(seconds)
    }

    pub fn seconds(self) -> u32 {
        self.0
    }
}

impl FromStr for GameClock {
    type Err = GameError;

    /// Parses `MM:SS` (or `M:SS`). Surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || GameError::InvalidClock(s.to_string());
        let (mins, secs) = s.trim().split_once(':').ok_or_else(bad)?;
        let mins: u32 = mins.trim().parse().map_err(|_| bad())?;
        let secs: u32 = secs.trim().parse().map_err(|_| bad())?;
        if secs >= 60 {
            return Err(bad());
        }
        mins.checked_mul(60)
            .and_then(|m| m.checked_add(secs))
            .map(GameClock)
            .ok_or_else(bad)
    }
}

impl TryFrom<String> for GameClock {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GameClock> for String {
    fn from(clock: GameClock) -> Self {
        clock.to_string()
    }
}

impl fmt::Display for GameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_clock(self.0 as i64))
    }
}

/// Renders a number of seconds as `MM:SS`. Negative input renders as `00:00`.
pub fn to_clock(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Score from the tracked team's point of view: `(own, opponent)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Score {
    pub own: u32,
    pub opponent: u32,
}

impl Score {
    pub fn new(own: u32, opponent: u32) -> Self {
        Score { own, opponent }
    }

    /// Own points minus opponent points.
    pub fn differential(self) -> i32 {
        self.own as i32 - self.opponent as i32
    }

    /// The same score seen from the other bench.
    pub fn flipped(self) -> Self {
        Score {
            own: self.opponent,
            opponent: self.own,
        }
    }
}

impl FromStr for Score {
    type Err = GameError;

    /// Parses `own-opponent`, e.g. `26-23`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || GameError::InvalidScore(s.to_string());
        let (own, opponent) = s.trim().split_once('-').ok_or_else(bad)?;
        Ok(Score {
            own: own.trim().parse().map_err(|_| bad())?,
            opponent: opponent.trim().parse().map_err(|_| bad())?,
        })
    }
}

impl TryFrom<String> for Score {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Score> for String {
    fn from(score: Score) -> Self {
        score.to_string()
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.own, self.opponent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PeriodMarker {
    #[default]
    None,
    StartOfPeriod,
    EndOfPeriod,
}

impl PeriodMarker {
    /// Recognizes the `START OF ...` / `END OF ...` rows every vendor emits.
    pub fn from_detail(detail: &str) -> Self {
        let upper = detail.to_uppercase();
        if upper.contains("START OF") {
            PeriodMarker::StartOfPeriod
        } else if upper.contains("END OF") {
            PeriodMarker::EndOfPeriod
        } else {
            PeriodMarker::None
        }
    }
}

/// One row of play-by-play, seen from the tracked team's bench.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub clock: GameClock,
    pub score: Score,
    pub team_detail: String,
    pub opponent_detail: String,
    pub marker: PeriodMarker,
}

impl Event {
    /// Builds an event, upper-casing both details and inferring the period
    /// marker from the team detail.
    pub fn new(clock: GameClock, score: Score, team_detail: &str, opponent_detail: &str) -> Self {
        let team_detail = team_detail.trim().to_uppercase();
        let opponent_detail = opponent_detail.trim().to_uppercase();
        let marker = match PeriodMarker::from_detail(&team_detail) {
            PeriodMarker::None => PeriodMarker::from_detail(&opponent_detail),
            m => m,
        };
        Event {
            clock,
            score,
            team_detail,
            opponent_detail,
            marker,
        }
    }

    pub fn start_of_period(clock: GameClock, score: Score) -> Self {
        Event::new(clock, score, "START OF PERIOD", "START OF PERIOD")
    }

    pub fn end_of_period(score: Score) -> Self {
        Event::new(GameClock::ZERO, score, "END OF PERIOD", "END OF PERIOD")
    }

    pub fn with_marker(mut self, marker: PeriodMarker) -> Self {
        self.marker = marker;
        self
    }

    /// Swaps the two benches, for replaying a game from the opponent's side.
    pub fn flipped(&self) -> Self {
        Event {
            clock: self.clock,
            score: self.score.flipped(),
            team_detail: self.opponent_detail.clone(),
            opponent_detail: self.team_detail.clone(),
            marker: self.marker,
        }
    }
}
