//! Segment builder: collapses repaired snapshots into lineup segments.
//!
//! A segment is one run of a settled lineup (see
//! [`lineup_runs`](crate::tracker::lineup_runs)) with the game time it
//! covered, the score change over it and the box counts of every event in it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GameError;
use crate::event::{Event, GameClock, PeriodMarker, Score};
use crate::names::PlayerId;
use crate::repair::LINEUP_SIZE;
use crate::stats::{BoxCounts, StatTuple};
use crate::tracker::{CourtSnapshot, lineup_runs};
use crate::vocab::Vocabulary;

/// A game with fewer lineup boundaries than this carried no usable
/// substitution records.
pub const MIN_BOUNDARIES: usize = 6;

/// Who played whom, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub date: NaiveDate,
    pub team: String,
    pub opponent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub date: NaiveDate,
    pub team: String,
    pub opponent: String,
    pub period: usize,
    pub time_in: GameClock,
    pub time_out: GameClock,
    pub score_in: Score,
    pub score_out: Score,
    /// Sorted player ids; fewer than five when the lineup is unknown.
    pub lineup: Vec<PlayerId>,
    pub canonical: bool,
    pub elapsed_seconds: u32,
    pub plus_minus: i32,
    pub stats: StatTuple,
}

impl Segment {
    pub fn possessions(&self) -> f64 {
        self.stats.team.possessions()
    }

    pub fn opponent_possessions(&self) -> f64 {
        self.stats.opponent.possessions()
    }
}

/// Builds the segments of one game from its events and repaired snapshots.
///
/// Segment `k` runs from its first event's clock to the first clock of
/// segment `k + 1`. When the next segment opens a new period, or its clock
/// reads later than this segment's start, the segment ends at `00:00`. The
/// last segment ends at the last event's clock. The score coming in is the
/// score the previous segment left with, so plus/minus telescopes over the
/// game.
pub fn build_segments(
    info: &GameInfo,
    events: &[Event],
    snapshots: &[CourtSnapshot],
    vocab: &dyn Vocabulary,
) -> Result<Vec<Segment>, GameError> {
    if events.is_empty() || snapshots.is_empty() {
        return Err(GameError::EmptyGame);
    }

    let runs = lineup_runs(events, snapshots);
    if runs.len() < MIN_BOUNDARIES {
        warn!(
            team = %info.team,
            opponent = %info.opponent,
            date = %info.date,
            boundaries = runs.len(),
            "game has no usable substitution data"
        );
        return Err(GameError::NoSubstitutionData {
            boundaries: runs.len(),
        });
    }

    let mut segments = Vec::with_capacity(runs.len());
    let mut score_in = events[snapshots[0].event_index].score;

    for (k, run) in runs.iter().enumerate() {
        let first = &snapshots[run.start];
        let last = &snapshots[run.end - 1];
        let time_in = events[first.event_index].clock;

        let time_out = match runs.get(k + 1) {
            Some(next) => {
                let next_event = &events[snapshots[next.start].event_index];
                if next_event.marker == PeriodMarker::StartOfPeriod || next_event.clock > time_in {
                    GameClock::ZERO
                } else {
                    next_event.clock
                }
            }
            None => events[last.event_index].clock.min(time_in),
        };

        let mut team = BoxCounts::default();
        let mut opponent = BoxCounts::default();
        for snap in &snapshots[run.clone()] {
            let event = &events[snap.event_index];
            vocab.tally(&event.team_detail, &mut team);
            vocab.tally(&event.opponent_detail, &mut opponent);
        }

        let score_out = events[last.event_index].score;
        let lineup: Vec<PlayerId> = first.lineup.iter().cloned().collect();
        let canonical = lineup.len() == LINEUP_SIZE;
        if !canonical {
            debug!(period = first.period, players = lineup.len(), %time_in, "non-canonical segment");
        }

        segments.push(Segment {
            date: info.date,
            team: info.team.clone(),
            opponent: info.opponent.clone(),
            period: first.period,
            time_in,
            time_out,
            score_in,
            score_out,
            lineup,
            canonical,
            elapsed_seconds: time_in.seconds() - time_out.seconds(),
            plus_minus: score_out.differential() - score_in.differential(),
            stats: StatTuple::new(team, opponent),
        });
        score_in = score_out;
    }

    Ok(segments)
}
