//! CLI entry point for the lineup rater.
//!
//! Provides subcommands for building a season's lineup segments from
//! play-by-play, rolling them up into lineup tables, and splitting a team's
//! season on one player.

use anyhow::Result;
use clap::{Parser, Subcommand};
use lineup_rater::config::RaterConfig;
use lineup_rater::efficiency::MetricRow;
use lineup_rater::game::process_spec;
use lineup_rater::ingest::load_manifest;
use lineup_rater::names::normalize_name;
use lineup_rater::output::{
    RejectedGame, append_record, append_segments, load_segments, metric_table_path,
    on_off_records, print_json, print_pretty, segment_store_path, write_metric_table,
};
use lineup_rater::percentile::PercentileTable;
use lineup_rater::rollup::{Rollup, on_off};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Instrument;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "lineup_rater")]
#[command(about = "Reconstructs basketball lineups from play-by-play and rates them", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build lineup segments for every game of a season manifest
    Segments {
        /// Manifest listing each game's event file, date, teams and starters
        #[arg(short, long)]
        manifest: PathBuf,

        /// Directory for segment stores and the rejected-game report
        #[arg(short, long, default_value = "lineups")]
        output_dir: PathBuf,

        /// Maximum number of games processed at once
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
    /// Build 1- to 5-player lineup tables from a segment store
    Lineups {
        /// Segment store CSV
        #[arg(short, long)]
        segments: PathBuf,

        /// Team whose lineups to rate
        #[arg(short, long)]
        team: String,

        /// Only build the table for this many players
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u8).range(1..=5))]
        players: Option<u8>,

        /// Reference percentile table CSV
        #[arg(short, long)]
        percentiles: Option<PathBuf>,

        /// Directory to write the tables to
        #[arg(short, long, default_value = "lineups")]
        output_dir: PathBuf,
    },
    /// Team efficiency with and without one player on the floor
    OnOff {
        /// Segment store CSV
        #[arg(short, long)]
        segments: PathBuf,

        #[arg(short, long)]
        team: String,

        /// Player name, in any spelling the play-by-play uses
        #[arg(short, long)]
        player: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/lineup_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("lineup_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = RaterConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Segments {
            manifest,
            output_dir,
            concurrency,
        } => {
            build_season(&manifest, &output_dir, concurrency, config).await?;
        }
        Commands::Lineups {
            segments,
            team,
            players,
            percentiles,
            output_dir,
        } => {
            let table = percentiles.map(PercentileTable::load).transpose()?;
            let sizes = match players {
                Some(n) => vec![usize::from(n)],
                None => (1..=5).rev().collect(),
            };
            build_tables(&segments, &team, &sizes, table.as_ref(), &output_dir, &config)?;
        }
        Commands::OnOff {
            segments,
            team,
            player,
        } => {
            let segments = load_segments(&segments)?;
            let player = normalize_name(&player);
            let split = on_off(&segments, &team, &player);
            if split.with.segments == 0 {
                warn!(%team, %player, "Player never on the floor in a full lineup");
            }
            print_pretty(&split);
            print_json(&on_off_records(&split, config.game_minutes))?;
        }
    }

    Ok(())
}

/// Processes every manifest game with at most `concurrency` games in flight,
/// then writes segments and rejections in manifest order.
#[tracing::instrument(skip(config), fields(manifest = %manifest.display(), output_dir = %output_dir.display()))]
async fn build_season(
    manifest: &Path,
    output_dir: &Path,
    concurrency: usize,
    config: RaterConfig,
) -> Result<()> {
    let games = load_manifest(manifest)?;
    info!(games = games.len(), concurrency, "Manifest loaded");

    // Create output directory if it doesn't exist
    std::fs::create_dir_all(output_dir)?;
    let rejected_path = output_dir.join("rejected.csv");

    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrency.max(1)));
    let config = Arc::new(config);
    let mut tasks = vec![];

    for spec in games {
        let sem = semaphore.clone();
        let config = config.clone();
        let rejected = RejectedGame {
            date: spec.date,
            team: spec.team.clone(),
            opponent: spec.opponent.clone(),
            reason: String::new(),
        };

        let game_span = tracing::info_span!(
            "process_game",
            team = %spec.team,
            opponent = %spec.opponent,
            date = %spec.date,
        );

        let task = tokio::spawn(
            async move {
                let _permit = sem.acquire_owned().await?;
                let outcomes =
                    tokio::task::spawn_blocking(move || process_spec(&spec, &config)).await??;
                Ok::<_, anyhow::Error>(outcomes)
            }
            .instrument(game_span),
        );
        tasks.push((rejected, task));
    }

    let (mut written, mut rejected_count) = (0usize, 0usize);
    for (rejected, task) in tasks {
        let outcomes = match task.await {
            Ok(Ok(outcomes)) => outcomes,
            Ok(Err(e)) => {
                error!(team = %rejected.team, opponent = %rejected.opponent, error = %e, "Game failed to load");
                record_rejection(&rejected_path, rejected, format!("{e:#}"))?;
                rejected_count += 1;
                continue;
            }
            Err(e) => {
                error!(team = %rejected.team, opponent = %rejected.opponent, error = %e, "Game task panicked");
                record_rejection(&rejected_path, rejected, format!("task failed: {e}"))?;
                rejected_count += 1;
                continue;
            }
        };

        for outcome in outcomes {
            match outcome.result {
                Ok(lineups) => {
                    let path = segment_store_path(output_dir, &outcome.info.team);
                    append_segments(&path, &lineups.segments)?;
                    written += lineups.segments.len();
                }
                Err(e) => {
                    let rejected = RejectedGame {
                        date: outcome.info.date,
                        team: outcome.info.team,
                        opponent: outcome.info.opponent,
                        reason: String::new(),
                    };
                    record_rejection(&rejected_path, rejected, e.to_string())?;
                    rejected_count += 1;
                }
            }
        }
    }

    info!(segments = written, rejected = rejected_count, "Finished processing season");
    Ok(())
}

/// Appends a game to the rejected-game report with `reason`.
fn record_rejection(path: &Path, rejected: RejectedGame, reason: String) -> Result<()> {
    append_record(path, &RejectedGame { reason, ..rejected })
}

/// Writes one lineup table per requested size.
#[tracing::instrument(skip(table, config), fields(segments = %segments.display()))]
fn build_tables(
    segments: &Path,
    team: &str,
    sizes: &[usize],
    table: Option<&PercentileTable>,
    output_dir: &Path,
    config: &RaterConfig,
) -> Result<()> {
    let segments = load_segments(segments)?;
    let rollup = Rollup::from_segments(&segments);
    if rollup.team_seconds(team) == 0 {
        warn!(team, teams = ?rollup.teams().collect::<Vec<_>>(), "No segments for team");
    }

    std::fs::create_dir_all(output_dir)?;
    for &n in sizes {
        let rows: Vec<MetricRow> = rollup
            .table(team, n, config.min_share)
            .into_iter()
            .map(|row| MetricRow::new(row, config.game_minutes, table))
            .collect();
        write_metric_table(metric_table_path(output_dir, team, n), &rows)?;
    }
    Ok(())
}
