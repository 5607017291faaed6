//! Reads normalized event files and season manifests.
//!
//! An event file is a CSV with the columns
//! `clock,score,team_detail,opponent_detail` and an optional `marker`
//! (`StartOfPeriod`/`EndOfPeriod`). Blank clocks and scores are common in
//! transcribed play-by-play: a blank clock on a period start takes the
//! period's nominal length, a blank on a period end reads `00:00`, and any
//! other blank carries the previous row's value forward.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{PeriodFormat, RaterConfig};
use crate::event::{Event, GameClock, PeriodMarker, Score};
use crate::vocab::VendorFormat;

#[derive(Debug, Deserialize)]
struct EventRecord {
    clock: Option<String>,
    score: Option<String>,
    #[serde(default)]
    team_detail: String,
    #[serde(default)]
    opponent_detail: String,
    #[serde(default)]
    marker: Option<PeriodMarker>,
}

pub fn read_events(
    reader: impl Read,
    config: &RaterConfig,
    format: PeriodFormat,
) -> Result<Vec<Event>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut events = Vec::new();
    let mut clock = GameClock::ZERO;
    let mut score = Score::default();
    let mut periods = 0;

    for (row, record) in rdr.deserialize::<EventRecord>().enumerate() {
        let record = record.with_context(|| format!("event row {}", row + 1))?;

        if let Some(raw) = record.score.as_deref().filter(|s| !s.is_empty()) {
            score = raw.parse().with_context(|| format!("event row {}", row + 1))?;
        }

        let mut event = Event::new(clock, score, &record.team_detail, &record.opponent_detail);
        if let Some(marker) = record.marker {
            event = event.with_marker(marker);
        }

        clock = match record.clock.as_deref().filter(|c| !c.is_empty()) {
            Some(raw) => raw.parse().with_context(|| format!("event row {}", row + 1))?,
            None => match event.marker {
                PeriodMarker::StartOfPeriod => config.period_start(format, periods),
                PeriodMarker::EndOfPeriod => GameClock::ZERO,
                PeriodMarker::None => clock,
            },
        };
        if event.marker == PeriodMarker::StartOfPeriod {
            periods += 1;
        }

        event.clock = clock;
        events.push(event);
    }

    debug!(events = events.len(), periods, "Read event file");
    Ok(events)
}

pub fn load_events(
    path: impl AsRef<Path>,
    config: &RaterConfig,
    format: PeriodFormat,
) -> Result<Vec<Event>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening event file {}", path.display()))?;
    read_events(file, config, format).with_context(|| format!("reading {}", path.display()))
}

/// One game of a season manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSpec {
    /// Event file, relative to the manifest.
    pub events: PathBuf,
    pub date: NaiveDate,
    pub team: String,
    pub opponent: String,
    /// First-period starters of `team`; may be empty.
    #[serde(default)]
    pub starters: Vec<String>,
    /// When present, the opponent's lineups are built too.
    #[serde(default)]
    pub opponent_starters: Option<Vec<String>>,
    /// Overrides the configured vendor.
    #[serde(default)]
    pub vendor: Option<VendorFormat>,
    #[serde(default)]
    pub period_format: Option<PeriodFormat>,
}

/// Reads a JSON array of [`GameSpec`]s, resolving event paths against the
/// manifest's directory.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<GameSpec>> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading manifest {}", path.display()))?;
    let mut games: Vec<GameSpec> = serde_json::from_str(&data)
        .with_context(|| format!("parsing manifest {}", path.display()))?;

    let base = path.parent().unwrap_or(Path::new("."));
    for game in &mut games {
        if game.events.is_relative() {
            game.events = base.join(&game.events);
        }
    }
    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    const EVENTS: &str = r#"clock,score,team_detail,opponent_detail,marker
,0-0,START OF 1ST HALF,,
19:40,0-0,"GOOD JUMPER BY SMITH,JOHN",,
,2-0,,MISS LAYUP BY DOE,
00:00,2-0,END OF 1ST HALF,,
,,START OF 2ND HALF,,
,2-0,,,EndOfPeriod
"#;

    #[test]
    fn test_blank_clocks_and_scores() {
        let config = RaterConfig::default();
        let events = read_events(EVENTS.as_bytes(), &config, PeriodFormat::Halves).unwrap();

        assert_eq!(events.len(), 6);
        assert_eq!(events[0].clock.seconds(), 1200);
        assert_eq!(events[0].marker, PeriodMarker::StartOfPeriod);
        assert_eq!(events[1].clock.seconds(), 1180);
        // Carried forward from the row above.
        assert_eq!(events[2].clock.seconds(), 1180);
        assert_eq!(events[2].score, Score::new(2, 0));
        assert_eq!(events[2].opponent_detail, "MISS LAYUP BY DOE");
        assert_eq!(events[4].clock.seconds(), 1200);
        assert_eq!(events[4].score, Score::new(2, 0));
        assert_eq!(events[5].marker, PeriodMarker::EndOfPeriod);
        assert_eq!(events[5].clock, GameClock::ZERO);
    }

    #[test]
    fn test_quarters_and_overtime_start_clocks() {
        let csv = "clock,score,team_detail,opponent_detail\n\
                   ,0-0,START OF 1ST QUARTER,\n\
                   ,0-0,START OF 2ND QUARTER,\n\
                   ,0-0,START OF 3RD QUARTER,\n\
                   ,0-0,START OF 4TH QUARTER,\n\
                   ,0-0,START OF OT,\n";
        let config = RaterConfig::default();
        let events = read_events(csv.as_bytes(), &config, PeriodFormat::Quarters).unwrap();
        let clocks: Vec<u32> = events.iter().map(|e| e.clock.seconds()).collect();
        assert_eq!(clocks, vec![600, 600, 600, 600, 300]);
    }

    #[test]
    fn test_bad_clock_is_error() {
        let csv = "clock,score,team_detail,opponent_detail\n9:75,0-0,GOOD JUMPER BY A,\n";
        let err = read_events(csv.as_bytes(), &RaterConfig::default(), PeriodFormat::Halves)
            .unwrap_err();
        assert!(format!("{err:#}").contains("9:75"));
    }

    #[test]
    fn test_huge_clock_is_error() {
        let csv = "clock,score,team_detail,opponent_detail\n99999999:00,0-0,GOOD JUMPER BY A,\n";
        let err = read_events(csv.as_bytes(), &RaterConfig::default(), PeriodFormat::Halves)
            .unwrap_err();
        assert!(format!("{err:#}").contains("malformed game clock"));
    }

    #[test]
    fn test_manifest_resolves_relative_paths() {
        let dir = env::temp_dir().join("lineup_rater_test_manifest");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("season.json");
        fs::write(
            &path,
            r#"[{"events": "g1.csv", "date": "2024-01-06", "team": "Home",
                "opponent": "Away", "starters": ["Smith, John"], "vendor": "cbsi"}]"#,
        )
        .unwrap();

        let games = load_manifest(&path).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].events, dir.join("g1.csv"));
        assert_eq!(games[0].vendor, Some(VendorFormat::Cbsi));
        assert!(games[0].opponent_starters.is_none());

        fs::remove_dir_all(&dir).unwrap();
    }
}
