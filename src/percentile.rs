//! Ranks efficiency metrics against a national reference table.
//!
//! The reference table is a CSV with one column per metric, named as in
//! [`Metric::column`], plus a `Percentile` column. Rows run from the best
//! band to the worst; a value takes the percentile of the first band it
//! reaches, and anything that reaches no band ranks at [`FLOOR`].

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::efficiency::Efficiency;

/// Percentile given to a value below every band of the table.
pub const FLOOR: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Pace,
    Net,
    Oe,
    De,
    EfgPct,
    ThreePtRate,
    ToRate,
    OrebPct,
    FtRate,
    OppEfgPct,
    OppThreePtRate,
    OppToRate,
    OppOrebPct,
    OppFtRate,
}

impl Metric {
    pub const ALL: [Metric; 14] = [
        Metric::Pace,
        Metric::Net,
        Metric::Oe,
        Metric::De,
        Metric::EfgPct,
        Metric::ThreePtRate,
        Metric::ToRate,
        Metric::OrebPct,
        Metric::FtRate,
        Metric::OppEfgPct,
        Metric::OppThreePtRate,
        Metric::OppToRate,
        Metric::OppOrebPct,
        Metric::OppFtRate,
    ];

    /// Header of the metric's column in the reference table.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Pace => "PACE",
            Metric::Net => "NET",
            Metric::Oe => "OE",
            Metric::De => "DE",
            Metric::EfgPct => "eFG%",
            Metric::ThreePtRate => "3PTrate",
            Metric::ToRate => "TOrate",
            Metric::OrebPct => "OREB%",
            Metric::FtRate => "FTrate",
            Metric::OppEfgPct => "Opp eFG%",
            Metric::OppThreePtRate => "Opp 3PTrate",
            Metric::OppToRate => "Opp TOrate",
            Metric::OppOrebPct => "Opp OREB%",
            Metric::OppFtRate => "Opp FTrate",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Metric::Pace
            | Metric::Net
            | Metric::Oe
            | Metric::EfgPct
            | Metric::ThreePtRate
            | Metric::OrebPct
            | Metric::FtRate
            | Metric::OppToRate => Direction::HigherIsBetter,
            Metric::De
            | Metric::ToRate
            | Metric::OppEfgPct
            | Metric::OppThreePtRate
            | Metric::OppFtRate
            | Metric::OppOrebPct => Direction::LowerIsBetter,
        }
    }

    pub fn value(self, e: &Efficiency) -> f64 {
        match self {
            Metric::Pace => e.pace,
            Metric::Net => e.net,
            Metric::Oe => e.oe,
            Metric::De => e.de,
            Metric::EfgPct => e.efg_pct,
            Metric::ThreePtRate => e.three_pt_rate,
            Metric::ToRate => e.to_rate,
            Metric::OrebPct => e.oreb_pct,
            Metric::FtRate => e.ft_rate,
            Metric::OppEfgPct => e.opp_efg_pct,
            Metric::OppThreePtRate => e.opp_three_pt_rate,
            Metric::OppToRate => e.opp_to_rate,
            Metric::OppOrebPct => e.opp_oreb_pct,
            Metric::OppFtRate => e.opp_ft_rate,
        }
    }
}

/// One band of the reference table.
#[derive(Debug, Clone, PartialEq)]
struct Band {
    percentile: f64,
    thresholds: [f64; Metric::ALL.len()],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PercentileTable {
    bands: Vec<Band>,
}

impl PercentileTable {
    /// Reads a reference table from CSV.
    ///
    /// Band order is taken as given; the table is not checked for
    /// monotonicity.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening percentile table {}", path.display()))?;
        let table = Self::from_reader(file)?;
        debug!(path = %path.display(), bands = table.bands.len(), "Loaded percentile table");
        Ok(table)
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| anyhow!("percentile table has no {name:?} column"))
        };

        let percentile_col = position("Percentile")?;
        let metric_cols = Metric::ALL
            .iter()
            .map(|m| position(m.column()))
            .collect::<Result<Vec<_>>>()?;

        let mut bands = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record?;
            let cell = |col: usize| -> Result<f64> {
                let raw = record.get(col).unwrap_or("");
                raw.parse()
                    .with_context(|| format!("band {}: bad number {raw:?}", line + 1))
            };
            let mut thresholds = [0.0; Metric::ALL.len()];
            for (slot, &col) in thresholds.iter_mut().zip(&metric_cols) {
                *slot = cell(col)?;
            }
            bands.push(Band {
                percentile: cell(percentile_col)?,
                thresholds,
            });
        }

        Ok(PercentileTable { bands })
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn rank(&self, metric: Metric, value: f64) -> f64 {
        let slot = metric as usize;
        self.bands
            .iter()
            .find(|band| {
                let threshold = band.thresholds[slot];
                match metric.direction() {
                    Direction::HigherIsBetter => value >= threshold,
                    Direction::LowerIsBetter => value <= threshold,
                }
            })
            .map_or(FLOOR, |band| band.percentile)
    }

    pub fn rank_all(&self, e: &Efficiency) -> Percentiles {
        let r = |m: Metric| self.rank(m, m.value(e));
        Percentiles {
            pace: r(Metric::Pace),
            net: r(Metric::Net),
            oe: r(Metric::Oe),
            de: r(Metric::De),
            efg_pct: r(Metric::EfgPct),
            three_pt_rate: r(Metric::ThreePtRate),
            to_rate: r(Metric::ToRate),
            oreb_pct: r(Metric::OrebPct),
            ft_rate: r(Metric::FtRate),
            opp_efg_pct: r(Metric::OppEfgPct),
            opp_three_pt_rate: r(Metric::OppThreePtRate),
            opp_to_rate: r(Metric::OppToRate),
            opp_oreb_pct: r(Metric::OppOrebPct),
            opp_ft_rate: r(Metric::OppFtRate),
        }
    }
}

/// National percentile of each metric of one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub pace: f64,
    pub net: f64,
    pub oe: f64,
    pub de: f64,
    pub efg_pct: f64,
    pub three_pt_rate: f64,
    pub to_rate: f64,
    pub oreb_pct: f64,
    pub ft_rate: f64,
    pub opp_efg_pct: f64,
    pub opp_three_pt_rate: f64,
    pub opp_to_rate: f64,
    pub opp_oreb_pct: f64,
    pub opp_ft_rate: f64,
}
