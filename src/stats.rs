use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Weight given to a free-throw attempt when estimating possessions.
pub const POSS_FTA_FACTOR: f64 = 0.44;

/// A single box-score action read from a play-by-play detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Assist,
    DefensiveRebound,
    OffensiveRebound,
    Turnover,
    Made2,
    Missed2,
    Made3,
    Missed3,
    MadeFreeThrow,
    MissedFreeThrow,
    Steal,
    Block,
    Foul,
}

/// Box-score counts for one side of the floor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxCounts {
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
}

impl BoxCounts {
    pub fn record(&mut self, action: Action) {
        match action {
            Action::Assist => self.ast += 1,
            Action::DefensiveRebound => self.dreb += 1,
            Action::OffensiveRebound => self.oreb += 1,
            Action::Turnover => self.to += 1,
            Action::Made2 => {
                self.fgm2 += 1;
                self.fga2 += 1;
            }
            Action::Missed2 => self.fga2 += 1,
            Action::Made3 => {
                self.fgm3 += 1;
                self.fga3 += 1;
            }
            Action::Missed3 => self.fga3 += 1,
            Action::MadeFreeThrow => {
                self.ftm += 1;
                self.fta += 1;
            }
            Action::MissedFreeThrow => self.fta += 1,
            Action::Steal => self.stl += 1,
            Action::Block => self.blk += 1,
            Action::Foul => self.fouls += 1,
        }
    }

    pub fn fgm(&self) -> u32 {
        self.fgm2 + self.fgm3
    }

    pub fn fga(&self) -> u32 {
        self.fga2 + self.fga3
    }

    pub fn points(&self) -> u32 {
        2 * self.fgm2 + 3 * self.fgm3 + self.ftm
    }

    /// Estimated possessions: `FGA + 0.44*FTA + TO - OREB`.
    ///
    /// Linear in the counts, so possessions of a sum equal the sum of
    /// possessions. Can be negative for tiny samples.
    pub fn possessions(&self) -> f64 {
        self.fga() as f64 + POSS_FTA_FACTOR * self.fta as f64 + self.to as f64
            - self.oreb as f64
    }
}

impl Add for BoxCounts {
    type Output = BoxCounts;

    fn add(mut self, rhs: BoxCounts) -> BoxCounts {
        self += rhs;
        self
    }
}

impl AddAssign for BoxCounts {
    fn add_assign(&mut self, rhs: BoxCounts) {
        self.fgm2 += rhs.fgm2;
        self.fga2 += rhs.fga2;
        self.fgm3 += rhs.fgm3;
        self.fga3 += rhs.fga3;
        self.ftm += rhs.ftm;
        self.fta += rhs.fta;
        self.ast += rhs.ast;
        self.to += rhs.to;
        self.oreb += rhs.oreb;
        self.dreb += rhs.dreb;
        self.stl += rhs.stl;
        self.blk += rhs.blk;
        self.fouls += rhs.fouls;
    }
}

/// Team and opponent counts over the same stretch of game time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatTuple {
    pub team: BoxCounts,
    pub opponent: BoxCounts,
}

impl StatTuple {
    pub fn new(team: BoxCounts, opponent: BoxCounts) -> Self {
        StatTuple { team, opponent }
    }
}

impl Add for StatTuple {
    type Output = StatTuple;

    fn add(mut self, rhs: StatTuple) -> StatTuple {
        self += rhs;
        self
    }
}

impl AddAssign for StatTuple {
    fn add_assign(&mut self, rhs: StatTuple) {
        self.team += rhs.team;
        self.opponent += rhs.opponent;
    }
}

impl Sum for StatTuple {
    fn sum<I: Iterator<Item = StatTuple>>(iter: I) -> Self {
        iter.fold(StatTuple::default(), Add::add)
    }
}

impl<'a> Sum<&'a StatTuple> for StatTuple {
    fn sum<I: Iterator<Item = &'a StatTuple>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
