//! Run configuration, read from a JSON file. Every field has a default, so
//! an empty object (or no file at all) is a valid configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::event::GameClock;
use crate::rollup::MIN_SHARE;
use crate::vocab::VendorFormat;

/// How regulation is divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodFormat {
    /// Two 20-minute halves (men's college).
    #[default]
    Halves,
    /// Four 10-minute quarters (women's college).
    Quarters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaterConfig {
    pub half_length: GameClock,
    pub quarter_length: GameClock,
    pub overtime_length: GameClock,
    /// Regulation minutes, used to scale pace.
    pub game_minutes: f64,
    /// Share of team seconds a 2- to 5-player row must exceed to be kept.
    pub min_share: f64,
    pub vendor: VendorFormat,
    pub period_format: PeriodFormat,
}

impl Default for RaterConfig {
    fn default() -> Self {
        Self {
            half_length: GameClock::from_seconds(20 * 60),
            quarter_length: GameClock::from_seconds(10 * 60),
            overtime_length: GameClock::from_seconds(5 * 60),
            game_minutes: crate::efficiency::GAME_MINUTES,
            min_share: MIN_SHARE,
            vendor: VendorFormat::Sidearm,
            period_format: PeriodFormat::Halves,
        }
    }
}

impl RaterConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: RaterConfig = serde_json::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!(path = %path.display(), vendor = %config.vendor, "Loaded config");
        Ok(config)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Clock a zero-based period starts at under `format`.
    pub fn period_start(&self, format: PeriodFormat, period: usize) -> GameClock {
        match format {
            PeriodFormat::Halves if period < 2 => self.half_length,
            PeriodFormat::Quarters if period < 4 => self.quarter_length,
            _ => self.overtime_length,
        }
    }
}
