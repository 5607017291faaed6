//! One game through the whole pipeline: track, repair, segment.

use anyhow::Result;
use tracing::{info, warn};

use crate::config::RaterConfig;
use crate::error::GameError;
use crate::event::Event;
use crate::ingest::{GameSpec, load_events};
use crate::names::normalize_name;
use crate::repair::{PeriodRepair, repair_game};
use crate::segment::{GameInfo, Segment, build_segments};
use crate::tracker::CourtTracker;
use crate::vocab::Vocabulary;

/// Segments of one team's side of a game, with the repair report.
#[derive(Debug, Clone)]
pub struct GameLineups {
    pub segments: Vec<Segment>,
    pub periods: Vec<PeriodRepair>,
    /// Vocabulary the game was read with, see [`Vocabulary::label`].
    pub vocabulary: String,
}

impl GameLineups {
    pub fn is_canonical(&self) -> bool {
        self.periods.iter().all(|p| p.canonical)
    }
}

/// Builds one team's lineup segments. `starters` are raw names; they are
/// canonicalized before seeding the first period.
#[tracing::instrument(
    skip(events, starters, vocab),
    fields(team = %info.team, opponent = %info.opponent, date = %info.date)
)]
pub fn process_game(
    info: &GameInfo,
    events: &[Event],
    starters: &[String],
    vocab: &dyn Vocabulary,
) -> Result<GameLineups, GameError> {
    if events.is_empty() {
        return Err(GameError::EmptyGame);
    }

    let tracker = CourtTracker::new(vocab, starters.iter().map(|s| normalize_name(s)));
    let snapshots = tracker.replay(events);
    let repaired = repair_game(events, &snapshots, vocab);
    let segments = build_segments(info, events, &repaired.snapshots, vocab)?;

    let vocabulary = vocab.label();
    info!(
        segments = segments.len(),
        periods = repaired.periods.len(),
        canonical = repaired.is_canonical(),
        %vocabulary,
        "Built lineup segments"
    );
    Ok(GameLineups {
        segments,
        periods: repaired.periods,
        vocabulary,
    })
}

/// Result for one side of a manifest game.
#[derive(Debug)]
pub struct SideOutcome {
    pub info: GameInfo,
    pub result: Result<GameLineups, GameError>,
}

/// Loads a manifest game's events and builds the team's side, plus the
/// opponent's side when opponent starters are listed.
pub fn process_spec(spec: &GameSpec, config: &RaterConfig) -> Result<Vec<SideOutcome>> {
    let format = spec.period_format.unwrap_or(config.period_format);
    let vendor = spec.vendor.unwrap_or(config.vendor);
    let vocab = vendor.vocabulary();
    let events = load_events(&spec.events, config, format)?;

    let info = GameInfo {
        date: spec.date,
        team: spec.team.clone(),
        opponent: spec.opponent.clone(),
    };
    let mut outcomes = vec![SideOutcome {
        result: process_game(&info, &events, &spec.starters, &vocab),
        info,
    }];

    if let Some(opponent_starters) = &spec.opponent_starters {
        let flipped: Vec<Event> = events.iter().map(Event::flipped).collect();
        let info = GameInfo {
            date: spec.date,
            team: spec.opponent.clone(),
            opponent: spec.team.clone(),
        };
        outcomes.push(SideOutcome {
            result: process_game(&info, &flipped, opponent_starters, &vocab),
            info,
        });
    }

    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            warn!(team = %outcome.info.team, opponent = %outcome.info.opponent, error = %e, "Game rejected");
        }
    }
    Ok(outcomes)
}
