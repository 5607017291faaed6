//! Season aggregation of segments by lineup, and rollup to smaller groups.
//!
//! [`Rollup`] is an incremental reduce: segments can be added one game at a
//! time and the tables read at any point come out the same as if every
//! segment had been added at once.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::names::PlayerId;
use crate::repair::LINEUP_SIZE;
use crate::segment::Segment;
use crate::stats::StatTuple;

/// Rows at or below this share of the team's season seconds are dropped
/// from the 2- to 5-player tables.
pub const MIN_SHARE: f64 = 0.01;

/// Season totals for one lineup or sub-lineup of one team.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateRow {
    pub team: String,
    /// Sorted player ids.
    pub lineup: Vec<PlayerId>,
    pub total_seconds: u64,
    pub plus_minus: i64,
    pub segments: usize,
    pub stats: StatTuple,
}

impl AggregateRow {
    fn new(team: &str, lineup: Vec<PlayerId>) -> Self {
        AggregateRow {
            team: team.to_string(),
            lineup,
            ..Default::default()
        }
    }

    fn absorb(&mut self, other: &AggregateRow) {
        self.total_seconds += other.total_seconds;
        self.plus_minus += other.plus_minus;
        self.segments += other.segments;
        self.stats += other.stats;
    }

    fn add_segment(&mut self, segment: &Segment) {
        self.total_seconds += u64::from(segment.elapsed_seconds);
        self.plus_minus += i64::from(segment.plus_minus);
        self.segments += 1;
        self.stats += segment.stats;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Rollup {
    groups: BTreeMap<(String, Vec<PlayerId>), AggregateRow>,
    team_seconds: BTreeMap<String, u64>,
}

impl Rollup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a Segment>) -> Self {
        let mut rollup = Self::new();
        rollup.extend(segments);
        rollup
    }

    pub fn add(&mut self, segment: &Segment) {
        let mut lineup = segment.lineup.clone();
        lineup.sort();
        self.groups
            .entry((segment.team.clone(), lineup.clone()))
            .or_insert_with(|| AggregateRow::new(&segment.team, lineup))
            .add_segment(segment);
        *self.team_seconds.entry(segment.team.clone()).or_default() +=
            u64::from(segment.elapsed_seconds);
    }

    pub fn extend<'a>(&mut self, segments: impl IntoIterator<Item = &'a Segment>) {
        for segment in segments {
            self.add(segment);
        }
    }

    /// Seconds of every segment of `team`, including unknown lineups.
    pub fn team_seconds(&self, team: &str) -> u64 {
        self.team_seconds.get(team).copied().unwrap_or(0)
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.team_seconds.keys().map(String::as_str)
    }

    /// Rows for every group of `n` players of `team`, largest total first.
    ///
    /// A lineup of `k` known players contributes to each of its `C(k, n)`
    /// subsets, so a non-canonical segment still counts toward the smaller
    /// groups it is certain about. A lineup of more than five players says
    /// nothing certain and only counts toward the team total. For `n >= 2` rows whose seconds are not
    /// strictly above `min_share` of the team total are dropped; the
    /// single-player table is never filtered.
    pub fn table(&self, team: &str, n: usize, min_share: f64) -> Vec<AggregateRow> {
        if n == 0 || n > LINEUP_SIZE {
            return Vec::new();
        }

        let mut rows: BTreeMap<Vec<PlayerId>, AggregateRow> = BTreeMap::new();
        for ((group_team, lineup), row) in &self.groups {
            if group_team != team || lineup.len() < n || lineup.len() > LINEUP_SIZE {
                continue;
            }
            if n == LINEUP_SIZE {
                rows.insert(lineup.clone(), row.clone());
                continue;
            }
            for subset in combinations(lineup, n) {
                rows.entry(subset.clone())
                    .or_insert_with(|| AggregateRow::new(team, subset))
                    .absorb(row);
            }
        }

        let threshold = min_share * self.team_seconds(team) as f64;
        let mut rows: Vec<AggregateRow> = rows
            .into_values()
            .filter(|r| n == 1 || r.total_seconds as f64 > threshold)
            .collect();
        rows.sort_by(|a, b| {
            b.total_seconds
                .cmp(&a.total_seconds)
                .then_with(|| a.lineup.cmp(&b.lineup))
        });
        rows
    }

    pub fn five_man_table(&self, team: &str, min_share: f64) -> Vec<AggregateRow> {
        self.table(team, LINEUP_SIZE, min_share)
    }
}

/// Every `n`-element subset of `items`, in lexicographic index order.
pub fn combinations<T: Clone>(items: &[T], n: usize) -> Vec<Vec<T>> {
    let mut out = Vec::new();
    if n > items.len() {
        return out;
    }

    let mut idx: Vec<usize> = (0..n).collect();
    loop {
        out.push(idx.iter().map(|&i| items[i].clone()).collect());

        // Advance the rightmost index that still has room.
        let Some(pos) = (0..n).rev().find(|&i| idx[i] < items.len() - n + i) else {
            return out;
        };
        idx[pos] += 1;
        for i in pos + 1..n {
            idx[i] = idx[i - 1] + 1;
        }
    }
}

/// A team's season with one player on the floor, without them, and overall.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnOffSplit {
    pub player: PlayerId,
    pub with: AggregateRow,
    pub without: AggregateRow,
    pub all: AggregateRow,
}

/// Splits `team`'s segments on whether `player` was on the floor.
///
/// Only segments with a full five-man lineup can say who was off the floor,
/// so the other two rows skip the rest; `all` counts every segment.
pub fn on_off<'a>(
    segments: impl IntoIterator<Item = &'a Segment>,
    team: &str,
    player: &str,
) -> OnOffSplit {
    let mut with = AggregateRow::new(team, vec![player.to_string()]);
    let mut without = AggregateRow::new(team, Vec::new());
    let mut all = AggregateRow::new(team, Vec::new());

    for segment in segments.into_iter().filter(|s| s.team == team) {
        all.add_segment(segment);
        if segment.lineup.len() != LINEUP_SIZE {
            continue;
        }
        if segment.lineup.iter().any(|p| p == player) {
            with.add_segment(segment);
        } else {
            without.add_segment(segment);
        }
    }

    OnOffSplit {
        player: player.to_string(),
        with,
        without,
        all,
    }
}
