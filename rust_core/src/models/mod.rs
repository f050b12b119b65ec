// Shared models for the livestream box score
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::stream::rules::StatRules;

pub mod message;
pub mod session;
pub mod stats;

pub use message::{MessageBody, MessageIds, ProtocolMessage};
pub use session::SessionContext;
pub use stats::{StatCounter, StatLine};

// ============================================================================
// Sport
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SportCode {
    /// Men's basketball
    MBB,
    /// Women's basketball
    WBB,
}

impl SportCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SportCode::MBB => "MBB",
            SportCode::WBB => "WBB",
        }
    }
}

impl fmt::Display for SportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SportCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MBB" => Ok(SportCode::MBB),
            "WBB" => Ok(SportCode::WBB),
            other => Err(format!("unsupported sport code: {other:?} (expected MBB or WBB)")),
        }
    }
}

// ============================================================================
// Plays
// ============================================================================

/// One play submission as pulled off the wire, before it is attributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPlay {
    pub play_id: u64,
    pub text: String,
    pub clock: String,
    pub period: u32,
}

/// A play that has been applied to a player.
///
/// Two plays are the same event when id, text, clock and period all agree;
/// `recorded_at` is bookkeeping only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Play {
    pub play_id: u64,
    pub play_text: String,
    pub clock: String,
    pub period: u32,
    pub recorded_at: DateTime<Utc>,
}

impl Play {
    pub fn is_same_event(&self, play_id: u64, play_text: &str, clock: &str, period: u32) -> bool {
        self.play_id == play_id
            && self.play_text == play_text
            && self.clock == clock
            && self.period == period
    }
}

/// Result of offering a play to a player
#[derive(Debug)]
pub enum PlayApplication<'a> {
    /// New event; `matched` lists every counter that was incremented
    Recorded {
        play: &'a Play,
        matched: Vec<StatCounter>,
    },
    /// The exact tuple was already applied, nothing changed
    Duplicate(&'a Play),
}

impl PlayApplication<'_> {
    pub fn play(&self) -> &Play {
        match self {
            PlayApplication::Recorded { play, .. } => play,
            PlayApplication::Duplicate(play) => play,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, PlayApplication::Duplicate(_))
    }
}

// ============================================================================
// Players & Scoreboards
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub number: String,
    pub position: String,
    pub starter: bool,
    pub on_court: bool,
    pub minutes_played: String,
    pub stats: StatLine,
    pub plays: Vec<Play>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: String::new(),
            position: String::new(),
            starter: false,
            on_court: false,
            minutes_played: "0:00".to_string(),
            stats: StatLine::new(),
            plays: Vec::new(),
        }
    }

    pub fn stat(&self, counter: StatCounter) -> u32 {
        self.stats.get(counter)
    }

    /// Apply a play at most once.
    ///
    /// A tuple already present is returned untouched. Otherwise the play text
    /// is run through `rules`, the play is appended, and the counters that
    /// fired are reported. An empty `matched` list means no rule recognized
    /// the text; the play is still recorded.
    pub fn add_play(
        &mut self,
        play_id: u64,
        play_text: &str,
        clock: &str,
        period: u32,
        rules: &StatRules,
    ) -> PlayApplication<'_> {
        if let Some(pos) = self
            .plays
            .iter()
            .position(|p| p.is_same_event(play_id, play_text, clock, period))
        {
            return PlayApplication::Duplicate(&self.plays[pos]);
        }

        let matched = rules.apply(play_text, &mut self.stats);
        self.plays.push(Play {
            play_id,
            play_text: play_text.to_string(),
            clock: clock.to_string(),
            period,
            recorded_at: Utc::now(),
        });

        PlayApplication::Recorded {
            play: &self.plays[self.plays.len() - 1],
            matched,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scoreboard {
    pub team_name: String,
    pub team_logo_url: Option<String>,
    /// Bound lazily from the first play that resolves against this roster
    pub team_shortname: Option<String>,
    pub players: Vec<Player>,
}

impl Scoreboard {
    pub fn new(team_name: impl Into<String>, players: Vec<Player>) -> Self {
        Self {
            team_name: team_name.into(),
            team_logo_url: None,
            team_shortname: None,
            players,
        }
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        let name = name.trim();
        self.players.iter().find(|p| p.name == name)
    }

    pub fn player_by_name_mut(&mut self, name: &str) -> Option<&mut Player> {
        let name = name.trim();
        self.players.iter_mut().find(|p| p.name == name)
    }

    /// Sum of a counter across the roster
    pub fn team_total(&self, counter: StatCounter) -> u32 {
        self.players.iter().map(|p| p.stat(counter)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sport_code_parse() {
        assert_eq!("mbb".parse::<SportCode>(), Ok(SportCode::MBB));
        assert_eq!(" WBB ".parse::<SportCode>(), Ok(SportCode::WBB));
        assert!("NFL".parse::<SportCode>().is_err());
        assert_eq!(SportCode::WBB.to_string(), "WBB");
    }

    #[test]
    fn test_add_play_is_idempotent() {
        let rules = StatRules::standard();
        let mut player = Player::new("John Doe");

        let first = player.add_play(7, "John Doe(ABC) made Layup", "12:01", 1, &rules);
        assert!(!first.is_duplicate());

        let second = player.add_play(7, "John Doe(ABC) made Layup", "12:01", 1, &rules);
        assert!(second.is_duplicate());
        assert_eq!(second.play().play_id, 7);

        assert_eq!(player.plays.len(), 1);
        assert_eq!(player.stat(StatCounter::FieldGoalsMade), 1);
        assert_eq!(player.stat(StatCounter::FieldGoalsAttempted), 1);
        assert_eq!(player.stat(StatCounter::Points), 2);
    }

    #[test]
    fn test_add_play_tuple_differs_by_clock() {
        let rules = StatRules::standard();
        let mut player = Player::new("John Doe");

        player.add_play(7, "John Doe(ABC) Turnover", "12:01", 1, &rules);
        player.add_play(7, "John Doe(ABC) Turnover", "11:40", 1, &rules);

        assert_eq!(player.plays.len(), 2);
        assert_eq!(player.stat(StatCounter::Turnovers), 2);
    }

    #[test]
    fn test_unmatched_play_is_still_recorded() {
        let rules = StatRules::standard();
        let mut player = Player::new("John Doe");

        match player.add_play(3, "John Doe(ABC) Substitution in", "5:00", 2, &rules) {
            PlayApplication::Recorded { matched, .. } => assert!(matched.is_empty()),
            PlayApplication::Duplicate(_) => panic!("first sighting reported as duplicate"),
        }
        assert_eq!(player.plays.len(), 1);
        assert!(player.stats.iter().all(|(_, v)| v == 0));
    }

    #[test]
    fn test_player_lookup_trims_name() {
        let board = Scoreboard::new("Alpha", vec![Player::new("John Doe")]);
        assert!(board.player_by_name(" John Doe ").is_some());
        assert!(board.player_by_name("Jane Doe").is_none());
    }
}
