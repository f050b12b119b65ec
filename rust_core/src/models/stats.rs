//! Counting statistics kept for every player.
//!
//! The counters are a closed, ordered set. Each one knows the column header
//! it is published under on the box-score page, so mapping between the page
//! and the ledger goes through [`StatCounter::from_header`] instead of any
//! field reflection.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatCounter {
    FieldGoalsMade,
    FieldGoalsAttempted,
    ThreePointFieldGoalsMade,
    ThreePointFieldGoalsAttempted,
    FreeThrowsMade,
    FreeThrowsAttempted,
    Points,
    OffensiveRebounds,
    DefensiveRebounds,
    TotalRebounds,
    Assists,
    Turnovers,
    Steals,
    Blocks,
    Fouls,
    Disqualifications,
    TechnicalFouls,
}

impl StatCounter {
    pub const COUNT: usize = 17;

    /// All counters in box-score column order.
    pub const ALL: [StatCounter; Self::COUNT] = [
        StatCounter::FieldGoalsMade,
        StatCounter::FieldGoalsAttempted,
        StatCounter::ThreePointFieldGoalsMade,
        StatCounter::ThreePointFieldGoalsAttempted,
        StatCounter::FreeThrowsMade,
        StatCounter::FreeThrowsAttempted,
        StatCounter::Points,
        StatCounter::OffensiveRebounds,
        StatCounter::DefensiveRebounds,
        StatCounter::TotalRebounds,
        StatCounter::Assists,
        StatCounter::Turnovers,
        StatCounter::Steals,
        StatCounter::Blocks,
        StatCounter::Fouls,
        StatCounter::Disqualifications,
        StatCounter::TechnicalFouls,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatCounter::FieldGoalsMade => "field_goals_made",
            StatCounter::FieldGoalsAttempted => "field_goals_attempted",
            StatCounter::ThreePointFieldGoalsMade => "three_point_field_goals_made",
            StatCounter::ThreePointFieldGoalsAttempted => "three_point_field_goals_attempted",
            StatCounter::FreeThrowsMade => "free_throws_made",
            StatCounter::FreeThrowsAttempted => "free_throws_attempted",
            StatCounter::Points => "points",
            StatCounter::OffensiveRebounds => "offensive_rebounds",
            StatCounter::DefensiveRebounds => "defensive_rebounds",
            StatCounter::TotalRebounds => "total_rebounds",
            StatCounter::Assists => "assists",
            StatCounter::Turnovers => "turnovers",
            StatCounter::Steals => "steals",
            StatCounter::Blocks => "blocks",
            StatCounter::Fouls => "fouls",
            StatCounter::Disqualifications => "disqualifications",
            StatCounter::TechnicalFouls => "technical_fouls",
        }
    }

    /// Column header used by the box-score page
    pub fn header(&self) -> &'static str {
        match self {
            StatCounter::FieldGoalsMade => "FGM",
            StatCounter::FieldGoalsAttempted => "FGA",
            StatCounter::ThreePointFieldGoalsMade => "3FGM",
            StatCounter::ThreePointFieldGoalsAttempted => "3FGA",
            StatCounter::FreeThrowsMade => "FTM",
            StatCounter::FreeThrowsAttempted => "FTA",
            StatCounter::Points => "PTS",
            StatCounter::OffensiveRebounds => "ORebs",
            StatCounter::DefensiveRebounds => "DRebs",
            StatCounter::TotalRebounds => "Rebs",
            StatCounter::Assists => "A",
            StatCounter::Turnovers => "TO",
            StatCounter::Steals => "S",
            StatCounter::Blocks => "B",
            StatCounter::Fouls => "F",
            StatCounter::Disqualifications => "DQ",
            StatCounter::TechnicalFouls => "TFoul",
        }
    }

    pub fn from_header(header: &str) -> Option<StatCounter> {
        Self::ALL.into_iter().find(|c| c.header() == header)
    }
}

impl fmt::Display for StatCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-player counters, indexed by [`StatCounter`].
///
/// Only ever incremented; there is no way to lower or reset a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    values: [u32; StatCounter::COUNT],
}

impl StatLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, counter: StatCounter) -> u32 {
        self.values[counter.index()]
    }

    pub fn increment(&mut self, counter: StatCounter, by: u32) {
        let slot = &mut self.values[counter.index()];
        *slot = slot.saturating_add(by);
    }

    /// Iterate `(counter, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (StatCounter, u32)> + '_ {
        StatCounter::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}
