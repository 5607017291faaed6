//! Token tables for the built-in vendor formats.
//!
//! Stat rules are tried in order and the first match wins, so a more
//! specific token must come before any token it contains.

use crate::stats::Action;

/// `token` found in a detail records `action`, unless `unless` is also present.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub token: &'static str,
    pub unless: Option<&'static str>,
    pub action: Action,
}

const fn rule(token: &'static str, action: Action) -> Rule {
    Rule {
        token,
        unless: None,
        action,
    }
}

const fn rule_unless(token: &'static str, unless: &'static str, action: Action) -> Rule {
    Rule {
        token,
        unless: Some(unless),
        action,
    }
}

/// A substitution line is recognized by `marker`; the player name is what
/// is left after removing `strip`.
#[derive(Debug, Clone, Copy)]
pub struct SubToken {
    pub marker: &'static str,
    pub strip: &'static str,
}

/// How the credited player is read off an action line.
#[derive(Debug, Clone, Copy)]
pub enum ActorRule {
    /// Name follows ` BY `; `strip` tokens are removed, digits too when
    /// `strip_digits` is set (foul counters such as `(P1T7)`). Names
    /// containing a `reject` token are not players.
    AfterBy {
        strip: &'static [&'static str],
        strip_digits: bool,
        reject: &'static [&'static str],
    },
    /// Name is whatever remains after removing every vocabulary word.
    StripWords { words: &'static [&'static str] },
}

#[derive(Debug)]
pub struct VocabTable {
    pub name: &'static str,
    pub version: u32,
    pub sub_in: SubToken,
    pub sub_out: SubToken,
    pub sub_line: &'static [&'static str],
    pub rules: &'static [Rule],
    pub actor: ActorRule,
}

pub static SIDEARM: VocabTable = VocabTable {
    name: "sidearm",
    version: 1,
    sub_in: SubToken {
        marker: "SUB IN",
        strip: "SUB IN BY ",
    },
    sub_out: SubToken {
        marker: "SUB OUT",
        strip: "SUB OUT BY ",
    },
    sub_line: &["SUB "],
    rules: &[
        rule("ASSIST", Action::Assist),
        rule("REBOUND DEF", Action::DefensiveRebound),
        rule("REBOUND OFF", Action::OffensiveRebound),
        rule("TURNOVER", Action::Turnover),
        rule("GOOD JUMPER", Action::Made2),
        rule("GOOD LAYUP", Action::Made2),
        rule("GOOD TIPIN", Action::Made2),
        rule("GOOD DUNK", Action::Made2),
        rule("MISS JUMPER", Action::Missed2),
        rule("MISS LAYUP", Action::Missed2),
        rule("MISS TIPIN", Action::Missed2),
        rule("MISS DUNK", Action::Missed2),
        rule("GOOD 3PTR", Action::Made3),
        rule("MISS 3PTR", Action::Missed3),
        rule("GOOD FT", Action::MadeFreeThrow),
        rule("MISS FT", Action::MissedFreeThrow),
        rule("STEAL", Action::Steal),
        rule("BLOCK", Action::Block),
        rule("FOUL", Action::Foul),
    ],
    actor: ActorRule::AfterBy {
        strip: &["(FASTBREAK)", "(IN THE PAINT)"],
        strip_digits: false,
        reject: &["TEAM"],
    },
};

const PRESTO_WORDS: &[&str] = &[
    "FOUL", "TURNOVER", "MISSED", "3-PT.", "DEFENSIVE", "REBOUND", "OFFENSIVE", "DEADBALL",
    "MADE", "ASSIST", "LAYUP", "STEAL", "BLOCK", "TIP-IN", "THROW", "DUNK", "TECHNICAL", "BY",
    "FREE", "JUMP", "SHOT",
];

pub static PRESTO: VocabTable = VocabTable {
    name: "presto",
    version: 1,
    sub_in: SubToken {
        marker: "ENTERS THE GAME",
        strip: "ENTERS THE GAME",
    },
    sub_out: SubToken {
        marker: "GOES TO THE BENCH",
        strip: "GOES TO THE BENCH",
    },
    sub_line: &["ENTERS THE", "TO THE BENCH"],
    rules: &[
        rule("ASSIST", Action::Assist),
        rule("DEFENSIVE REBOUND", Action::DefensiveRebound),
        rule("OFFENSIVE REBOUND", Action::OffensiveRebound),
        rule("TURNOVER", Action::Turnover),
        rule("MADE JUMP SHOT", Action::Made2),
        rule("MADE LAYUP", Action::Made2),
        rule("MADE DUNK", Action::Made2),
        rule("MADE TIP-IN", Action::Made2),
        rule("MISSED JUMP SHOT", Action::Missed2),
        rule("MISSED LAYUP", Action::Missed2),
        rule("MISSED DUNK", Action::Missed2),
        rule("MISSED TIP-IN", Action::Missed2),
        rule("MADE 3-PT. JUMP SHOT", Action::Made3),
        rule("MISSED 3-PT. JUMP SHOT", Action::Missed3),
        rule("MADE FREE THROW", Action::MadeFreeThrow),
        rule("MISSED FREE THROW", Action::MissedFreeThrow),
        rule("STEAL", Action::Steal),
        rule("BLOCK", Action::Block),
        rule("FOUL", Action::Foul),
    ],
    actor: ActorRule::StripWords { words: PRESTO_WORDS },
};

pub static CBSI: VocabTable = VocabTable {
    name: "cbsi",
    version: 1,
    sub_in: SubToken {
        marker: "SUB IN",
        strip: "SUB IN : ",
    },
    sub_out: SubToken {
        marker: "SUB OUT",
        strip: "SUB OUT: ",
    },
    sub_line: &["SUB "],
    rules: &[
        rule("ASSIST", Action::Assist),
        rule_unless("REBOUND (DEF)", "(DEADBALL)", Action::DefensiveRebound),
        rule_unless("REBOUND (OFF)", "(DEADBALL)", Action::OffensiveRebound),
        rule("TURNOVR", Action::Turnover),
        rule("GOOD! JUMPER", Action::Made2),
        rule("GOOD! LAYUP", Action::Made2),
        rule("GOOD! TIP-IN", Action::Made2),
        rule("GOOD! DUNK", Action::Made2),
        rule("MISSED JUMPER", Action::Missed2),
        rule("MISSED LAYUP", Action::Missed2),
        rule("MISSED TIP-IN", Action::Missed2),
        rule("MISSED DUNK", Action::Missed2),
        rule("GOOD! 3 PTR", Action::Made3),
        rule("MISSED 3 PTR", Action::Missed3),
        rule("GOOD! FT SHOT", Action::MadeFreeThrow),
        rule("MISSED FT SHOT", Action::MissedFreeThrow),
        rule("STEAL", Action::Steal),
        rule("BLOCK", Action::Block),
        rule("FOUL", Action::Foul),
    ],
    actor: ActorRule::AfterBy {
        strip: &["[FB/PNT]", "[PNT]", "[FB]", "THE BENCH", "(PT)", "(P)", "(T)"],
        strip_digits: true,
        reject: &["TEAM", "(DEADBALL)"],
    },
};
