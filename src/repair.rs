//! Lineup repair: fixes snapshots that track too few or too many players.
//!
//! Play-by-play is typed in by a person during the game. Substitutions go
//! missing in one direction (a player is logged out but never in, or the
//! reverse), and starters of later periods are never listed at all. Repair
//! runs once per period, after the tracker has seen the whole period, and
//! uses the only remaining evidence: who the text says did something.
//!
//! Under-count (fewer than five):
//! 1. a player subbed out who appears in no earlier snapshot of the period
//!    started the period, and is added to every snapshot before the sub out;
//!    substitutions logged at the period's opening clock before any play
//!    are applied from the period's first row;
//! 2. a player credited with an action who appears in no snapshot at all
//!    played the whole period, and is added everywhere;
//! 3. a run still short of five takes the players credited inside the run.
//!
//! Over-count (more than five): the run's lineup is replaced by the players
//! credited with actions inside the run. If that still exceeds five the run
//! is cleared. Clearing discards information on purpose: those segments keep
//! counting toward team totals and smaller sub-lineups, never toward an
//! exact five-man lineup that cannot be known.
//!
//! All passes return new snapshot vectors; the tracker output is untouched.

use serde::Serialize;
use tracing::{debug, warn};

use crate::event::{Event, PeriodMarker};
use crate::names::PlayerId;
use crate::tracker::{CourtSnapshot, Lineup, lineup_runs, period_ranges};
use crate::vocab::{Substitution, Vocabulary};

pub const LINEUP_SIZE: usize = 5;

/// What repair did to one period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeriodRepair {
    pub period: usize,
    /// Players added by the under-count passes, in the order found.
    pub inserted: Vec<PlayerId>,
    /// Over-count runs replaced by the players credited inside them.
    pub rebuilt_runs: usize,
    /// Over-count runs that could not be reconciled and were cleared.
    pub cleared_runs: usize,
    /// Every settled snapshot holds exactly five players.
    pub canonical: bool,
}

#[derive(Debug, Clone)]
pub struct RepairedGame {
    pub snapshots: Vec<CourtSnapshot>,
    pub periods: Vec<PeriodRepair>,
}

impl RepairedGame {
    pub fn is_canonical(&self) -> bool {
        self.periods.iter().all(|p| p.canonical)
    }
}

/// Repairs every period of a game.
pub fn repair_game(
    events: &[Event],
    snapshots: &[CourtSnapshot],
    vocab: &dyn Vocabulary,
) -> RepairedGame {
    let mut repaired = Vec::with_capacity(snapshots.len());
    let mut periods = Vec::new();

    for range in period_ranges(snapshots) {
        let (snaps, report) = repair_period(events, &snapshots[range], vocab);
        repaired.extend(snaps);
        periods.push(report);
    }

    RepairedGame {
        snapshots: repaired,
        periods,
    }
}

/// Repairs the snapshots of a single period.
pub fn repair_period(
    events: &[Event],
    snapshots: &[CourtSnapshot],
    vocab: &dyn Vocabulary,
) -> (Vec<CourtSnapshot>, PeriodRepair) {
    let period = snapshots.first().map_or(0, |s| s.period);
    let mut report = PeriodRepair {
        period,
        ..Default::default()
    };

    let snaps = backfill_starters(events, snapshots.to_vec(), vocab, &mut report);
    let snaps = settle_opening_subs(events, snaps, vocab);
    let snaps = insert_silent_players(events, snaps, vocab, &mut report);
    let snaps = fill_short_runs(events, snaps, vocab, &mut report);
    let snaps = trim_long_runs(events, snaps, vocab, &mut report);

    report.canonical = snaps
        .iter()
        .filter(|s| !s.mid_substitution)
        .all(|s| s.lineup.len() == LINEUP_SIZE);

    if !report.canonical {
        warn!(
            period,
            cleared_runs = report.cleared_runs,
            "period lineup could not be fully reconstructed"
        );
    }

    (snaps, report)
}

fn insert_into(snaps: &mut [CourtSnapshot], player: &PlayerId) {
    for snap in snaps {
        snap.lineup.insert(player.clone());
    }
}

fn record_insert(report: &mut PeriodRepair, player: &PlayerId) {
    if !report.inserted.contains(player) {
        report.inserted.push(player.clone());
    }
}

/// Players credited with an action in `snaps`, first-seen order.
fn credited_players(
    events: &[Event],
    snaps: &[CourtSnapshot],
    vocab: &dyn Vocabulary,
) -> Vec<PlayerId> {
    let mut players: Vec<PlayerId> = Vec::new();
    for snap in snaps {
        if let Some(actor) = vocab.actor(&events[snap.event_index].team_detail)
            && !players.contains(&actor)
        {
            players.push(actor);
        }
    }
    players
}

/// Pass 1: a player subbed out who was never seen earlier in the period
/// started it.
fn backfill_starters(
    events: &[Event],
    mut snaps: Vec<CourtSnapshot>,
    vocab: &dyn Vocabulary,
    report: &mut PeriodRepair,
) -> Vec<CourtSnapshot> {
    for i in 0..snaps.len() {
        let detail = &events[snaps[i].event_index].team_detail;
        let Some(Substitution::Out(player)) = vocab.substitution(detail) else {
            continue;
        };
        if snaps[..i].iter().any(|s| s.lineup.contains(&player)) {
            continue;
        }
        debug!(period = report.period, %player, until = i, "backfilling period starter");
        insert_into(&mut snaps[..i], &player);
        record_insert(report, &player);
    }
    snaps
}

/// Substitutions logged at the opening clock, before any play, set the
/// lineup the period starts with.
fn settle_opening_subs(
    events: &[Event],
    mut snaps: Vec<CourtSnapshot>,
    vocab: &dyn Vocabulary,
) -> Vec<CourtSnapshot> {
    let Some(first) = snaps.first() else {
        return snaps;
    };
    let opening = &events[first.event_index];
    if opening.marker != PeriodMarker::StartOfPeriod {
        return snaps;
    }

    let block = snaps[1..]
        .iter()
        .take_while(|s| {
            let e = &events[s.event_index];
            e.clock == opening.clock && vocab.is_substitution_line(&e.team_detail)
        })
        .count();
    if block == 0 {
        return snaps;
    }

    let settled = snaps[block].lineup.clone();
    for snap in &mut snaps[..block] {
        snap.lineup = settled.clone();
    }
    snaps
}

/// Pass 2: a player credited with an action but never on the tracked court
/// was on the floor for the whole period.
fn insert_silent_players(
    events: &[Event],
    mut snaps: Vec<CourtSnapshot>,
    vocab: &dyn Vocabulary,
    report: &mut PeriodRepair,
) -> Vec<CourtSnapshot> {
    let seen: Lineup = snaps.iter().flat_map(|s| s.lineup.iter().cloned()).collect();
    let missing: Vec<PlayerId> = credited_players(events, &snaps, vocab)
        .into_iter()
        .filter(|p| !seen.contains(p))
        .collect();

    for player in &missing {
        debug!(period = report.period, %player, "player credited but never tracked");
        insert_into(&mut snaps, player);
        record_insert(report, player);
    }
    snaps
}

/// Pass 3: a run still short of five takes in the players credited inside it.
fn fill_short_runs(
    events: &[Event],
    mut snaps: Vec<CourtSnapshot>,
    vocab: &dyn Vocabulary,
    report: &mut PeriodRepair,
) -> Vec<CourtSnapshot> {
    for run in lineup_runs(events, &snaps) {
        if snaps[run.start].lineup.len() >= LINEUP_SIZE {
            continue;
        }
        let on_court = snaps[run.start].lineup.clone();
        let to_add: Vec<PlayerId> = credited_players(events, &snaps[run.clone()], vocab)
            .into_iter()
            .filter(|p| !on_court.contains(p))
            .collect();

        for player in &to_add {
            debug!(period = report.period, %player, run_start = run.start, "filling short lineup");
            insert_into(&mut snaps[run.clone()], player);
            record_insert(report, player);
        }
    }
    snaps
}

/// Over-count: rebuild each run with more than five players from the
/// players credited inside it, or clear it.
fn trim_long_runs(
    events: &[Event],
    mut snaps: Vec<CourtSnapshot>,
    vocab: &dyn Vocabulary,
    report: &mut PeriodRepair,
) -> Vec<CourtSnapshot> {
    for run in lineup_runs(events, &snaps) {
        if snaps[run.start].lineup.len() <= LINEUP_SIZE {
            continue;
        }
        let credited = credited_players(events, &snaps[run.clone()], vocab);
        let lineup: Lineup = if credited.len() <= LINEUP_SIZE {
            report.rebuilt_runs += 1;
            credited.into_iter().collect()
        } else {
            report.cleared_runs += 1;
            warn!(
                period = report.period,
                run_start = run.start,
                credited = credited.len(),
                "too many players credited, clearing lineup"
            );
            Lineup::new()
        };

        for snap in &mut snaps[run] {
            snap.lineup = lineup.clone();
        }
    }
    snaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{GameClock, Score};
    use crate::tracker::CourtTracker;
    use crate::vocab::VendorFormat;

    #[test]
    fn test_sub_out_backfills_period_starter() {
        // Second period: only four players ever sub in; A starts silently
        // and is logged going out.
        let events = vec![
            Event::start_of_period(clock(1200), Score::default()),
            play(1200, "SUB IN BY B"),
            play(1200, "SUB IN BY C"),
            play(1200, "SUB IN BY D"),
            play(1200, "SUB IN BY E"),
            play(1100, "GOOD JUMPER BY B"),
            play(900, "SUB OUT BY A"),
            play(900, "SUB IN BY F"),
            play(800, "GOOD LAYUP BY F"),
            Event::end_of_period(Score::default()),
        ];
        let (snaps, report) = repair(&events, &[]);

        for snap in &snaps[..6] {
            assert!(snap.lineup.contains("A"), "A missing at {}", snap.event_index);
        }
        assert_eq!(snaps[0].lineup, lineup(&["A", "B", "C", "D", "E"]));
        assert!(!snaps[6].lineup.contains("A"));
        assert!(!snaps[9].lineup.contains("A"));
        assert_eq!(snaps[9].lineup, lineup(&["B", "C", "D", "E", "F"]));
        assert_eq!(report.inserted, vec!["A".to_string()]);
        assert!(report.canonical);
    }

    #[test]
    fn test_player_seen_earlier_is_not_backfilled() {
        let events = vec![
            Event::start_of_period(clock(1200), Score::default()),
            play(1000, "SUB IN BY F"),
            play(1000, "SUB OUT BY A"),
            play(900, "SUB IN BY A"),
            play(900, "SUB OUT BY F"),
            play(800, "SUB OUT BY A"),
            play(800, "SUB IN BY F"),
        ];
        let (snaps, _) = repair(&events, &["A", "B", "C", "D", "E"]);
        // A's second exit must not push A back into the rows where F played.
        assert!(!snaps[2].lineup.contains("A"));
        assert_eq!(snaps[2].lineup, lineup(&["B", "C", "D", "E", "F"]));
    }

    #[test]
    fn test_credited_player_fills_whole_period() {
        let events = vec![
            Event::start_of_period(clock(1200), Score::default()),
            play(1200, "SUB IN BY A"),
            play(1200, "SUB IN BY B"),
            play(1200, "SUB IN BY C"),
            play(1200, "SUB IN BY D"),
            play(1100, "GOOD JUMPER BY E"),
            play(1000, "GOOD LAYUP BY A"),
            Event::end_of_period(Score::default()),
        ];
        let (snaps, report) = repair(&events, &[]);

        assert!(snaps.iter().all(|s| s.lineup.contains("E")));
        assert_eq!(snaps[7].lineup, lineup(&["A", "B", "C", "D", "E"]));
        assert_eq!(report.inserted, vec!["E".to_string()]);
        assert!(report.canonical);
    }

    #[test]
    fn test_sixth_credited_player_triggers_rebuild() {
        // Five starters tracked, no subs, C2 credited with a basket.
        let events = vec![
            Event::start_of_period(clock(1200), Score::default()),
            play(1100, "GOOD JUMPER BY A"),
            play(1000, "GOOD LAYUP BY C2"),
            play(900, "REBOUND DEF BY B"),
            play(800, "ASSIST BY D"),
            play(700, "TURNOVER BY E"),
            Event::end_of_period(Score::default()),
        ];
        let (snaps, report) = repair(&events, &["A", "B", "C", "D", "E"]);

        assert_eq!(report.inserted, vec!["C2".to_string()]);
        assert_eq!(report.rebuilt_runs, 1);
        for snap in &snaps {
            assert_eq!(snap.lineup, lineup(&["A", "B", "C2", "D", "E"]));
        }
        assert!(report.canonical);
    }

    #[test]
    fn test_unreconcilable_run_is_cleared() {
        let events = vec![
            Event::start_of_period(clock(1200), Score::default()),
            play(1100, "GOOD JUMPER BY A"),
            play(1050, "GOOD JUMPER BY B"),
            play(1000, "GOOD JUMPER BY C"),
            play(950, "GOOD JUMPER BY D"),
            play(900, "GOOD JUMPER BY E"),
            play(850, "GOOD JUMPER BY F"),
            Event::end_of_period(Score::default()),
        ];
        let (snaps, report) = repair(&events, &["A", "B", "C", "D", "E"]);

        assert_eq!(report.cleared_runs, 1);
        assert!(!report.canonical);
        assert!(snaps.iter().all(|s| s.lineup.is_empty()));
    }

    #[test]
    fn test_every_period_is_five_or_flagged() {
        let events = vec![
            Event::start_of_period(clock(1200), Score::default()),
            play(1100, "GOOD JUMPER BY A"),
            Event::end_of_period(Score::default()),
            Event::start_of_period(clock(1200), Score::default()),
            play(1100, "SUB IN BY V"),
            play(1000, "GOOD JUMPER BY W"),
            Event::end_of_period(Score::default()),
        ];
        let vocab = VendorFormat::Sidearm.vocabulary();
        let tracker = CourtTracker::new(&vocab, lineup(&["A", "B", "C", "D", "E"]));
        let game = repair_game(&events, &tracker.replay(&events), &vocab);

        assert_eq!(game.periods.len(), 2);
        assert!(game.periods[0].canonical);
        assert!(!game.periods[1].canonical);
        assert!(!game.is_canonical());
        for snap in game.snapshots.iter().filter(|s| s.period == 0) {
            assert_eq!(snap.lineup.len(), LINEUP_SIZE);
        }
        assert!(
            game.snapshots
                .iter()
                .filter(|s| s.period == 1)
                .any(|s| s.lineup.len() != LINEUP_SIZE)
        );
    }

    #[test]
    fn test_opening_swap_applies_from_first_row() {
        let events = vec![
            Event::start_of_period(clock(1200), Score::default()),
            play(1200, "SUB IN BY F"),
            play(1200, "SUB OUT BY A"),
            play(1100, "GOOD JUMPER BY F"),
        ];
        let (snaps, report) = repair(&events, &["A", "B", "C", "D", "E"]);

        for snap in &snaps {
            assert_eq!(snap.lineup, lineup(&["B", "C", "D", "E", "F"]));
        }
        assert!(report.inserted.is_empty());
        assert!(report.canonical);
    }

    #[test]
    fn test_input_snapshots_untouched() {
        let events = vec![
            Event::start_of_period(clock(1200), Score::default()),
            play(900, "SUB OUT BY A"),
        ];
        let vocab = VendorFormat::Sidearm.vocabulary();
        let tracker = CourtTracker::new(&vocab, Vec::new());
        let original = tracker.replay(&events);
        let before = original.clone();
        let _ = repair_game(&events, &original, &vocab);
        assert_eq!(original, before);
    }

    fn repair(events: &[Event], starters: &[&str]) -> (Vec<CourtSnapshot>, PeriodRepair) {
        let vocab = VendorFormat::Sidearm.vocabulary();
        let tracker = CourtTracker::new(&vocab, lineup(starters));
        let snaps = tracker.replay(events);
        repair_period(events, &snaps, &vocab)
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
