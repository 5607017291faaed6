//! Per-possession efficiency rates for an aggregate row.

use serde::{Deserialize, Serialize};

use crate::percentile::{PercentileTable, Percentiles};
use crate::rollup::AggregateRow;
use crate::stats::{BoxCounts, StatTuple};

/// Regulation length, used to scale pace to a full game.
pub const GAME_MINUTES: f64 = 40.0;

/// `num / den`, or 0.0 when the denominator is zero.
pub fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Efficiency {
    pub poss: f64,
    pub opp_poss: f64,
    pub pace: f64,
    pub net: f64,
    pub oe: f64,
    pub to_rate: f64,
    pub efg_pct: f64,
    pub ft_rate: f64,
    pub three_pt_rate: f64,
    pub oreb_pct: f64,
    pub de: f64,
    pub opp_to_rate: f64,
    pub opp_efg_pct: f64,
    pub opp_ft_rate: f64,
    pub opp_three_pt_rate: f64,
    pub opp_oreb_pct: f64,
}

/// Shooting and ball-security rates for one side.
struct SideRates {
    points_per_poss: f64,
    to_rate: f64,
    efg_pct: f64,
    ft_rate: f64,
    three_pt_rate: f64,
}

impl SideRates {
    fn of(c: &BoxCounts) -> Self {
        let poss = c.possessions();
        let fga = c.fga() as f64;
        SideRates {
            points_per_poss: ratio(c.points() as f64, poss),
            to_rate: ratio(c.to as f64, poss),
            efg_pct: ratio(c.fgm() as f64 + 0.5 * c.fgm3 as f64, fga),
            ft_rate: ratio(c.fta as f64, fga),
            three_pt_rate: ratio(c.fga3 as f64, fga),
        }
    }
}

impl Efficiency {
    pub fn from_stats(stats: &StatTuple, total_seconds: u64, game_minutes: f64) -> Self {
        let (own, opp) = (&stats.team, &stats.opponent);
        let us = SideRates::of(own);
        let them = SideRates::of(opp);

        let poss = own.possessions();
        let opp_poss = opp.possessions();
        let minutes = total_seconds as f64 / 60.0;

        Efficiency {
            poss,
            opp_poss,
            pace: game_minutes * ratio(poss + opp_poss, 2.0 * minutes),
            net: us.points_per_poss - them.points_per_poss,
            oe: us.points_per_poss,
            to_rate: us.to_rate,
            efg_pct: us.efg_pct,
            ft_rate: us.ft_rate,
            three_pt_rate: us.three_pt_rate,
            oreb_pct: ratio(own.oreb as f64, (own.oreb + opp.dreb) as f64),
            de: them.points_per_poss,
            opp_to_rate: them.to_rate,
            opp_efg_pct: them.efg_pct,
            opp_ft_rate: them.ft_rate,
            opp_three_pt_rate: them.three_pt_rate,
            opp_oreb_pct: ratio(opp.oreb as f64, (opp.oreb + own.dreb) as f64),
        }
    }

    pub fn from_row(row: &AggregateRow, game_minutes: f64) -> Self {
        Self::from_stats(&row.stats, row.total_seconds, game_minutes)
    }
}

/// An aggregate row with its rates and, when a reference table is given,
/// their national percentiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub row: AggregateRow,
    pub efficiency: Efficiency,
    pub percentiles: Option<Percentiles>,
}

impl MetricRow {
    pub fn new(row: AggregateRow, game_minutes: f64, table: Option<&PercentileTable>) -> Self {
        let efficiency = Efficiency::from_row(&row, game_minutes);
        let percentiles = table.map(|t| t.rank_all(&efficiency));
        MetricRow {
            row,
            efficiency,
            percentiles,
        }
    }
}
