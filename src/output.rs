//! Output formatting and persistence for segments and lineup tables.
//!
//! Supports pretty-printing, JSON serialization, and CSV append. The season
//! segment store is an append-only CSV, one row per segment.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, info};

use crate::efficiency::MetricRow;
use crate::event::{GameClock, Score, to_clock};
use crate::names::PlayerId;
use crate::rollup::{AggregateRow, OnOffSplit};
use crate::segment::Segment;
use crate::stats::{BoxCounts, StatTuple};
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends a record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: impl AsRef<Path>, record: &impl Serialize) -> Result<()> {
    append_records(path, std::slice::from_ref(record))
}

/// Appends several records, writing the header only when the file is new.
pub fn append_records<T: Serialize>(path: impl AsRef<Path>, records: &[T]) -> Result<()> {
    let path = path.as_ref();
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, rows = records.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// One row of the segment store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub date: NaiveDate,
    pub team: String,
    pub opponent: String,
    pub period: usize,
    pub time_in: GameClock,
    pub time_out: GameClock,
    pub total_seconds: u32,
    pub score_in: Score,
    pub score_out: Score,
    pub plus_minus: i32,
    pub canonical: bool,
    pub player_a: Option<String>,
    pub player_b: Option<String>,
    pub player_c: Option<String>,
    pub player_d: Option<String>,
    pub player_e: Option<String>,
    pub poss: f64,
    pub fgm: u32,
    pub fga: u32,
    pub fgm2: u32,
    pub fga2: u32,
    pub fgm3: u32,
    pub fga3: u32,
    pub ftm: u32,
    pub fta: u32,
    pub ast: u32,
    pub to: u32,
    pub oreb: u32,
    pub dreb: u32,
    pub stl: u32,
    pub blk: u32,
    pub fouls: u32,
    pub opp_poss: f64,
    pub opp_fgm: u32,
    pub opp_fga: u32,
    pub opp_fgm2: u32,
    pub opp_fga2: u32,
    pub opp_fgm3: u32,
    pub opp_fga3: u32,
    pub opp_ftm: u32,
    pub opp_fta: u32,
    pub opp_ast: u32,
    pub opp_to: u32,
    pub opp_oreb: u32,
    pub opp_dreb: u32,
    pub opp_stl: u32,
    pub opp_blk: u32,
    pub opp_fouls: u32,
}

impl From<&Segment> for SegmentRecord {
    fn from(s: &Segment) -> Self {
        let player = |i: usize| s.lineup.get(i).cloned();
        let (t, o) = (&s.stats.team, &s.stats.opponent);
        SegmentRecord {
            date: s.date,
            team: s.team.clone(),
            opponent: s.opponent.clone(),
            period: s.period,
            time_in: s.time_in,
            time_out: s.time_out,
            total_seconds: s.elapsed_seconds,
            score_in: s.score_in,
            score_out: s.score_out,
            plus_minus: s.plus_minus,
            canonical: s.canonical,
            player_a: player(0),
            player_b: player(1),
            player_c: player(2),
            player_d: player(3),
            player_e: player(4),
            poss: s.possessions(),
            fgm: t.fgm(),
            fga: t.fga(),
            fgm2: t.fgm2,
            fga2: t.fga2,
            fgm3: t.fgm3,
            fga3: t.fga3,
            ftm: t.ftm,
            fta: t.fta,
            ast: t.ast,
            to: t.to,
            oreb: t.oreb,
            dreb: t.dreb,
            stl: t.stl,
            blk: t.blk,
            fouls: t.fouls,
            opp_poss: s.opponent_possessions(),
            opp_fgm: o.fgm(),
            opp_fga: o.fga(),
            opp_fgm2: o.fgm2,
            opp_fga2: o.fga2,
            opp_fgm3: o.fgm3,
            opp_fga3: o.fga3,
            opp_ftm: o.ftm,
            opp_fta: o.fta,
            opp_ast: o.ast,
            opp_to: o.to,
            opp_oreb: o.oreb,
            opp_dreb: o.dreb,
            opp_stl: o.stl,
            opp_blk: o.blk,
            opp_fouls: o.fouls,
        }
    }
}

/// Derived columns (`fgm`, `fga`, `poss`) are recomputed from the counts;
/// `canonical` is read as stored.
impl From<SegmentRecord> for Segment {
    fn from(r: SegmentRecord) -> Self {
        let mut lineup: Vec<PlayerId> = [r.player_a, r.player_b, r.player_c, r.player_d, r.player_e]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();
        lineup.sort();

        let team = BoxCounts {
            fgm2: r.fgm2,
            fga2: r.fga2,
            fgm3: r.fgm3,
            fga3: r.fga3,
            ftm: r.ftm,
            fta: r.fta,
            ast: r.ast,
            to: r.to,
            oreb: r.oreb,
            dreb: r.dreb,
            stl: r.stl,
            blk: r.blk,
            fouls: r.fouls,
        };
        let opponent = BoxCounts {
            fgm2: r.opp_fgm2,
            fga2: r.opp_fga2,
            fgm3: r.opp_fgm3,
            fga3: r.opp_fga3,
            ftm: r.opp_ftm,
            fta: r.opp_fta,
            ast: r.opp_ast,
            to: r.opp_to,
            oreb: r.opp_oreb,
            dreb: r.opp_dreb,
            stl: r.opp_stl,
            blk: r.opp_blk,
            fouls: r.opp_fouls,
        };

        Segment {
            date: r.date,
            team: r.team,
            opponent: r.opponent,
            period: r.period,
            time_in: r.time_in,
            time_out: r.time_out,
            score_in: r.score_in,
            score_out: r.score_out,
            canonical: r.canonical,
            lineup,
            elapsed_seconds: r.total_seconds,
            plus_minus: r.plus_minus,
            stats: StatTuple::new(team, opponent),
        }
    }
}

/// File-system friendly form of a team name: lower case, every run of
/// other characters collapsed to `_`.
pub fn team_slug(team: &str) -> String {
    let mut slug = String::with_capacity(team.len());
    for c in team.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}

/// `<dir>/<team>_all_lineups.csv`, the team's season segment store.
pub fn segment_store_path(dir: impl AsRef<Path>, team: &str) -> PathBuf {
    dir.as_ref().join(format!("{}_all_lineups.csv", team_slug(team)))
}

/// `<dir>/<TEAM><n>.csv`, the team's `n`-player lineup table.
pub fn metric_table_path(dir: impl AsRef<Path>, team: &str, n: usize) -> PathBuf {
    dir.as_ref()
        .join(format!("{}{}.csv", team_slug(team).to_uppercase(), n))
}

/// Appends one game's segments to the segment store.
pub fn append_segments(path: impl AsRef<Path>, segments: &[Segment]) -> Result<()> {
    let records: Vec<SegmentRecord> = segments.iter().map(SegmentRecord::from).collect();
    append_records(path, &records)
}

/// Reads every segment in a segment store.
pub fn load_segments(path: impl AsRef<Path>) -> Result<Vec<Segment>> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("opening segment store {}", path.display()))?;

    let mut segments = Vec::new();
    for (row, record) in rdr.deserialize::<SegmentRecord>().enumerate() {
        let record = record.with_context(|| format!("{} row {}", path.display(), row + 1))?;
        segments.push(Segment::from(record));
    }
    debug!(path = %path.display(), segments = segments.len(), "Loaded segment store");
    Ok(segments)
}

/// A game that produced no segments, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedGame {
    pub date: NaiveDate,
    pub team: String,
    pub opponent: String,
    pub reason: String,
}

/// One row of a lineup table. Percentile columns are empty when no
/// reference table was given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub team: String,
    pub player_a: Option<String>,
    pub player_b: Option<String>,
    pub player_c: Option<String>,
    pub player_d: Option<String>,
    pub player_e: Option<String>,
    pub total_time: String,
    pub total_seconds: u64,
    pub plus_minus: i64,
    pub poss: f64,
    pub pace: f64,
    pub pace_pctl: Option<f64>,
    pub net: f64,
    pub net_pctl: Option<f64>,
    pub oe: f64,
    pub oe_pctl: Option<f64>,
    pub de: f64,
    pub de_pctl: Option<f64>,
    pub efg_pct: f64,
    pub efg_pct_pctl: Option<f64>,
    pub three_pt_rate: f64,
    pub three_pt_rate_pctl: Option<f64>,
    pub to_rate: f64,
    pub to_rate_pctl: Option<f64>,
    pub oreb_pct: f64,
    pub oreb_pct_pctl: Option<f64>,
    pub ft_rate: f64,
    pub ft_rate_pctl: Option<f64>,
    pub opp_efg_pct: f64,
    pub opp_efg_pct_pctl: Option<f64>,
    pub opp_three_pt_rate: f64,
    pub opp_three_pt_rate_pctl: Option<f64>,
    pub opp_to_rate: f64,
    pub opp_to_rate_pctl: Option<f64>,
    pub opp_oreb_pct: f64,
    pub opp_oreb_pct_pctl: Option<f64>,
    pub opp_ft_rate: f64,
    pub opp_ft_rate_pctl: Option<f64>,
}

impl From<&MetricRow> for MetricRecord {
    fn from(m: &MetricRow) -> Self {
        let player = |i: usize| m.row.lineup.get(i).cloned();
        let e = &m.efficiency;
        let p = m.percentiles;
        MetricRecord {
            team: m.row.team.clone(),
            player_a: player(0),
            player_b: player(1),
            player_c: player(2),
            player_d: player(3),
            player_e: player(4),
            total_time: to_clock(m.row.total_seconds as i64),
            total_seconds: m.row.total_seconds,
            plus_minus: m.row.plus_minus,
            poss: e.poss,
            pace: e.pace,
            pace_pctl: p.map(|p| p.pace),
            net: e.net,
            net_pctl: p.map(|p| p.net),
            oe: e.oe,
            oe_pctl: p.map(|p| p.oe),
            de: e.de,
            de_pctl: p.map(|p| p.de),
            efg_pct: e.efg_pct,
            efg_pct_pctl: p.map(|p| p.efg_pct),
            three_pt_rate: e.three_pt_rate,
            three_pt_rate_pctl: p.map(|p| p.three_pt_rate),
            to_rate: e.to_rate,
            to_rate_pctl: p.map(|p| p.to_rate),
            oreb_pct: e.oreb_pct,
            oreb_pct_pctl: p.map(|p| p.oreb_pct),
            ft_rate: e.ft_rate,
            ft_rate_pctl: p.map(|p| p.ft_rate),
            opp_efg_pct: e.opp_efg_pct,
            opp_efg_pct_pctl: p.map(|p| p.opp_efg_pct),
            opp_three_pt_rate: e.opp_three_pt_rate,
            opp_three_pt_rate_pctl: p.map(|p| p.opp_three_pt_rate),
            opp_to_rate: e.opp_to_rate,
            opp_to_rate_pctl: p.map(|p| p.opp_to_rate),
            opp_oreb_pct: e.opp_oreb_pct,
            opp_oreb_pct_pctl: p.map(|p| p.opp_oreb_pct),
            opp_ft_rate: e.opp_ft_rate,
            opp_ft_rate_pctl: p.map(|p| p.opp_ft_rate),
        }
    }
}

/// Writes a lineup table, replacing any previous file.
pub fn write_metric_table(path: impl AsRef<Path>, rows: &[MetricRow]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(MetricRecord::from(row))?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "Wrote lineup table");
    Ok(())
}

/// One line of an on/off report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnOffRecord {
    pub split: &'static str,
    pub metrics: MetricRecord,
}

/// The with/without/all rows of an on/off split, in that order.
pub fn on_off_records(split: &OnOffSplit, game_minutes: f64) -> Vec<OnOffRecord> {
    let record = |label: &'static str, row: &AggregateRow| OnOffRecord {
        split: label,
        metrics: MetricRecord::from(&MetricRow::new(row.clone(), game_minutes, None)),
    };
    vec![
        record("with", &split.with),
        record("without", &split.without),
        record("all", &split.all),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair::LINEUP_SIZE;
    use crate::rollup::Rollup;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&segment(&["A", "B", "C", "D", "E"]));
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&segment(&["A", "B", "C", "D", "E"])).unwrap();
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("lineup_rater_test_header.csv");
        let _ = fs::remove_file(&path);

        let rejected = RejectedGame {
            date: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
            team: "Home".into(),
            opponent: "Away".into(),
            reason: "no substitutions".into(),
        };
        append_record(&path, &rejected).unwrap();
        append_record(&path, &rejected).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // Header line should appear exactly once
        let header_count = content.lines().filter(|l| l.contains("reason")).count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_names() {
        assert_eq!(team_slug("  St. John's (NY) "), "st_john_s_ny");
        assert_eq!(
            segment_store_path("out", "DePaul"),
            Path::new("out").join("depaul_all_lineups.csv")
        );
        assert_eq!(
            metric_table_path("out", "DePaul", 3),
            Path::new("out").join("DEPAUL3.csv")
        );
    }

    #[test]
    fn test_segment_store_round_trip() {
        let path = temp_path("lineup_rater_test_store.csv");
        let _ = fs::remove_file(&path);

        let full = segment(&["A", "B", "C", "D", "E"]);
        let partial = segment(&["A", "B"]);
        append_segments(&path, std::slice::from_ref(&full)).unwrap();
        append_segments(&path, std::slice::from_ref(&partial)).unwrap();

        let loaded = load_segments(&path).unwrap();
        assert_eq!(loaded, vec![full, partial]);
        assert!(!loaded[1].canonical);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_store_keeps_canonical_flag_and_possessions() {
        let path = temp_path("lineup_rater_test_store_flags.csv");
        let _ = fs::remove_file(&path);

        // Five names but flagged by repair: the flag survives the store.
        let mut flagged = segment(&["A", "B", "C", "D", "E"]);
        flagged.canonical = false;
        let record = SegmentRecord::from(&flagged);
        assert_eq!(record.poss, flagged.possessions());
        assert_eq!(record.opp_poss, flagged.opponent_possessions());
        assert!((record.poss - 2.88).abs() < 1e-9);

        append_segments(&path, std::slice::from_ref(&flagged)).unwrap();
        let loaded = load_segments(&path).unwrap();
        assert!(!loaded[0].canonical);
        assert_eq!(loaded[0], flagged);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_metric_table_has_blank_percentiles() {
        let path = temp_path("lineup_rater_test_metrics.csv");
        let rollup = Rollup::from_segments(&[segment(&["A", "B", "C", "D", "E"])]);
        let rows: Vec<MetricRow> = rollup
            .table("Home", 2, 0.0)
            .into_iter()
            .map(|r| MetricRow::new(r, 40.0, None))
            .collect();
        write_metric_table(&path, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 11);
        let first = content.lines().nth(1).unwrap();
        assert!(first.starts_with("Home,A,B,,,,05:00,300,"));
        assert!(first.contains(",,"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_on_off_records_order() {
        let segments = [segment(&["A", "B", "C", "D", "E"])];
        let split = crate::rollup::on_off(&segments, "Home", "F");
        let records = on_off_records(&split, 40.0);
        let labels: Vec<_> = records.iter().map(|r| r.split).collect();
        assert_eq!(labels, vec!["with", "without", "all"]);
        assert_eq!(records[1].metrics.total_seconds, 300);
        assert_eq!(records[0].metrics.total_seconds, 0);
    }

    fn segment(players: &[&str]) -> Segment {
        let mut team = BoxCounts::default();
        team.fgm3 = 1;
        team.fga3 = 2;
        team.fta = 2;
        let opponent = BoxCounts {
            fga2: 3,
            dreb: 1,
            ..Default::default()
        };
        Segment {
            date: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
            team: "Home".into(),
            opponent: "Away".into(),
            period: 1,
            time_in: GameClock::from_seconds(900),
            time_out: GameClock::from_seconds(600),
            score_in: Score::new(10, 8),
            score_out: Score::new(13, 8),
            lineup: players.iter().map(|p| p.to_string()).collect(),
            canonical: players.len() == LINEUP_SIZE,
            elapsed_seconds: 300,
            plus_minus: 3,
            stats: StatTuple::new(team, opponent),
        }
    }
}
