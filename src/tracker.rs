//! Court tracker: replays a game's events and records who is on the floor.
//!
//! The tracker is a fold over the event list. [`CourtTracker::step`] takes
//! the current [`CourtState`] and one event and returns the next state plus
//! a [`CourtSnapshot`] for that event; nothing is shared between games.

use std::collections::BTreeSet;
use std::ops::Range;

use tracing::debug;

use crate::event::{Event, PeriodMarker};
use crate::names::PlayerId;
use crate::vocab::{Substitution, Vocabulary};

pub type Lineup = BTreeSet<PlayerId>;

/// Who is on the floor after one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourtSnapshot {
    pub event_index: usize,
    /// Zero-based period the event belongs to.
    pub period: usize,
    pub lineup: Lineup,
    /// Set on a substitution line that is immediately followed by another
    /// one: the swap is only half recorded and the lineup is not settled.
    pub mid_substitution: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourtState {
    pub lineup: Lineup,
    /// Number of `START OF PERIOD` rows seen so far.
    pub periods_started: usize,
}

pub struct CourtTracker<'v> {
    vocab: &'v dyn Vocabulary,
    starters: Lineup,
}

impl<'v> CourtTracker<'v> {
    /// `starters` seeds the first period only; it may be empty when the
    /// starting five is unknown.
    pub fn new(vocab: &'v dyn Vocabulary, starters: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            vocab,
            starters: starters.into_iter().collect(),
        }
    }

    pub fn initial_state(&self) -> CourtState {
        CourtState {
            lineup: self.starters.clone(),
            periods_started: 0,
        }
    }

    /// Applies one event. `next` is the following event, if any, used to
    /// detect a substitution that spans several rows.
    pub fn step(
        &self,
        state: CourtState,
        index: usize,
        event: &Event,
        next: Option<&Event>,
    ) -> (CourtState, CourtSnapshot) {
        let CourtState {
            mut lineup,
            mut periods_started,
        } = state;
        let detail = event.team_detail.as_str();
        let mut mid_substitution = false;

        match event.marker {
            PeriodMarker::StartOfPeriod => {
                lineup = if periods_started == 0 {
                    self.starters.clone()
                } else {
                    Lineup::new()
                };
                periods_started += 1;
            }
            PeriodMarker::EndOfPeriod => {}
            PeriodMarker::None => {
                match self.vocab.substitution(detail) {
                    Some(Substitution::In(player)) => {
                        lineup.insert(player);
                    }
                    Some(Substitution::Out(player)) => {
                        if !lineup.remove(&player) {
                            debug!(event = index, %player, "sub out for player not on court");
                        }
                    }
                    None => {}
                }
                mid_substitution = self.vocab.is_substitution_line(detail)
                    && next.is_some_and(|n| self.vocab.is_substitution_line(&n.team_detail));
            }
        }

        let snapshot = CourtSnapshot {
            event_index: index,
            period: periods_started.saturating_sub(1),
            lineup: lineup.clone(),
            mid_substitution,
        };
        (
            CourtState {
                lineup,
                periods_started,
            },
            snapshot,
        )
    }

    /// Replays every event and returns one snapshot per event.
    pub fn replay(&self, events: &[Event]) -> Vec<CourtSnapshot> {
        let mut state = self.initial_state();
        let mut snapshots = Vec::with_capacity(events.len());

        for (index, event) in events.iter().enumerate() {
            let (next_state, snapshot) = self.step(state, index, event, events.get(index + 1));
            state = next_state;
            snapshots.push(snapshot);
        }

        snapshots
    }
}

/// Splits snapshots into runs of one settled lineup.
///
/// A run starts at the first snapshot, at every `START OF PERIOD`, and
/// wherever the lineup differs from the run's lineup outside a
/// mid-substitution window. Mid-substitution snapshots stay in the run that
/// is in progress.
pub fn lineup_runs(events: &[Event], snapshots: &[CourtSnapshot]) -> Vec<Range<usize>> {
    let mut starts = Vec::new();
    let mut current: Option<&Lineup> = None;

    for (i, snap) in snapshots.iter().enumerate() {
        let period_start = events[snap.event_index].marker == PeriodMarker::StartOfPeriod;
        let changed = !snap.mid_substitution && current != Some(&snap.lineup);
        if i == 0 || period_start || changed {
            starts.push(i);
            current = Some(&snap.lineup);
        }
    }

    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| start..starts.get(n + 1).copied().unwrap_or(snapshots.len()))
        .collect()
}

/// Splits snapshots into one index range per period.
pub fn period_ranges(snapshots: &[CourtSnapshot]) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for (i, snap) in snapshots.iter().enumerate() {
        match ranges.last_mut() {
            Some(r) if snapshots[r.start].period == snap.period => r.end = i + 1,
            _ => ranges.push(i..i + 1),
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{GameClock, Score};
    use crate::vocab::VendorFormat;

    #[test]
    fn test_starters_seed_first_period_only() {
        let vocab = VendorFormat::Sidearm.vocabulary();
        let tracker = CourtTracker::new(&vocab, lineup(&["A", "B", "C", "D", "E"]));
        let events = vec![
            Event::start_of_period(clock(1200), Score::default()),
            Event::end_of_period(Score::default()),
            Event::start_of_period(clock(1200), Score::default()),
        ];

        let snaps = tracker.replay(&events);
        assert_eq!(snaps[0].lineup.len(), 5);
        assert_eq!(snaps[0].period, 0);
        assert_eq!(snaps[1].lineup.len(), 5);
        assert!(snaps[2].lineup.is_empty());
        assert_eq!(snaps[2].period, 1);
    }

    #[test]
    fn test_sub_in_and_out() {
        let vocab = VendorFormat::Sidearm.vocabulary();
        let tracker = CourtTracker::new(&vocab, lineup(&["A", "B", "C", "D", "E"]));
        let events = vec![
            Event::start_of_period(clock(1200), Score::default()),
            play(1100, "SUB IN BY F"),
            play(1100, "SUB OUT BY A"),
            play(1050, "GOOD JUMPER BY B"),
            play(1000, "SUB OUT BY Z"),
        ];

        let snaps = tracker.replay(&events);
        assert_eq!(snaps[1].lineup.len(), 6);
        assert!(snaps[1].mid_substitution);
        assert!(!snaps[2].mid_substitution);
        assert_eq!(snaps[2].lineup, lineup(&["B", "C", "D", "E", "F"]));
        // Removing an absent player is ignored.
        assert_eq!(snaps[4].lineup, snaps[2].lineup);
    }

    #[test]
    fn test_unknown_detail_is_noop() {
        let vocab = VendorFormat::Sidearm.vocabulary();
        let tracker = CourtTracker::new(&vocab, lineup(&["A", "B"]));
        let state = tracker.initial_state();
        let (next, snap) = tracker.step(state.clone(), 0, &play(900, "TIMEOUT MEDIA"), None);
        assert_eq!(next, state);
        assert!(!snap.mid_substitution);
    }

    #[test]
    fn test_runs_skip_mid_substitution() {
        let vocab = VendorFormat::Sidearm.vocabulary();
        let tracker = CourtTracker::new(&vocab, lineup(&["A", "B", "C", "D", "E"]));
        let events = vec![
            Event::start_of_period(clock(1200), Score::default()),
            play(1150, "GOOD JUMPER BY A"),
            play(1100, "SUB IN BY F"),
            play(1100, "SUB IN BY G"),
            play(1100, "SUB OUT BY A"),
            play(1100, "SUB OUT BY B"),
            play(1050, "GOOD LAYUP BY F"),
        ];

        let snaps = tracker.replay(&events);
        assert!(snaps[2].mid_substitution);
        assert!(snaps[3].mid_substitution);
        assert!(snaps[4].mid_substitution);
        assert!(!snaps[5].mid_substitution);

        let runs = lineup_runs(&events, &snaps);
        assert_eq!(runs, vec![0..5, 5..7]);
    }

    #[test]
    fn test_period_ranges() {
        let vocab = VendorFormat::Sidearm.vocabulary();
        let tracker = CourtTracker::new(&vocab, Vec::new());
        let events = vec![
            Event::start_of_period(clock(1200), Score::default()),
            play(600, "GOOD JUMPER BY A"),
            Event::end_of_period(Score::default()),
            Event::start_of_period(clock(1200), Score::default()),
            Event::end_of_period(Score::default()),
        ];
        let snaps = tracker.replay(&events);
        assert_eq!(period_ranges(&snaps), vec![0..3, 3..5]);
    }

    fn clock(seconds: u32) -> GameClock {
        GameClock::from_seconds(seconds)
    }

    fn play(seconds: u32, detail: &str) -> Event {
        Event::new(clock(seconds), Score::default(), detail, "")
    }

    fn lineup(names: &[&str]) -> Lineup {
        names.iter().map(|n| n.to_string()).collect()
    }
}
