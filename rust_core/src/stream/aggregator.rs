//! Player/scoreboard aggregator.
//!
//! Owns both rosters for the game and is the only thing that mutates them.
//! A [`RawPlay`] is split into sub-events, each `Name(TEAM)` reference is
//! resolved to a player, and the sub-event is applied to that player once.

use crate::error::PlayWarning;
use crate::models::{PlayApplication, RawPlay, Scoreboard, StatCounter};
use crate::stream::parser::{parse_references, split_sub_events, PlayReference};
use crate::stream::rules::StatRules;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Away,
    Home,
}

/// What happened to one player reference inside a submitted play
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Applied {
        side: Side,
        player: String,
        matched: Vec<StatCounter>,
    },
    Duplicate {
        side: Side,
        player: String,
    },
    Warning(PlayWarning),
}

#[derive(Debug, Clone)]
pub struct Game {
    away: Scoreboard,
    home: Scoreboard,
    rules: StatRules,
}

impl Game {
    pub fn new(away: Scoreboard, home: Scoreboard) -> Self {
        Self::with_rules(away, home, StatRules::standard())
    }

    pub fn with_rules(away: Scoreboard, home: Scoreboard, rules: StatRules) -> Self {
        Self { away, home, rules }
    }

    pub fn away(&self) -> &Scoreboard {
        &self.away
    }

    pub fn home(&self) -> &Scoreboard {
        &self.home
    }

    pub fn scoreboard(&self, side: Side) -> &Scoreboard {
        match side {
            Side::Away => &self.away,
            Side::Home => &self.home,
        }
    }

    fn scoreboard_mut(&mut self, side: Side) -> &mut Scoreboard {
        match side {
            Side::Away => &mut self.away,
            Side::Home => &mut self.home,
        }
    }

    /// Find which roster a reference belongs to, binding team shorthands on
    /// first use.
    ///
    /// A roster whose shorthand already equals the reference is authoritative:
    /// the name is looked up there and nowhere else. Failing that, rosters
    /// that are still unbound are searched in order and the first one holding
    /// the name takes the shorthand for the rest of the session.
    pub fn resolve(&mut self, player_name: &str, team_shortname: &str) -> Option<Side> {
        for side in [Side::Away, Side::Home] {
            let board = self.scoreboard(side);
            if board.team_shortname.as_deref() == Some(team_shortname) {
                return board.player_by_name(player_name).map(|_| side);
            }
        }

        for side in [Side::Away, Side::Home] {
            let board = self.scoreboard_mut(side);
            if board.team_shortname.is_none() && board.player_by_name(player_name).is_some() {
                debug!(
                    "Bound team shorthand {} to {}",
                    team_shortname, board.team_name
                );
                board.team_shortname = Some(team_shortname.to_string());
                return Some(side);
            }
        }

        None
    }

    /// Attribute a play to every player it references.
    pub fn submit(&mut self, play: &RawPlay) -> Vec<PlayOutcome> {
        let mut outcomes = Vec::new();

        for sub_event in split_sub_events(&play.text) {
            for reference in parse_references(sub_event) {
                outcomes.push(self.apply_reference(play, sub_event, reference));
            }
        }

        outcomes
    }

    fn apply_reference(
        &mut self,
        play: &RawPlay,
        sub_event: &str,
        reference: PlayReference<'_>,
    ) -> PlayOutcome {
        let Some(side) = self.resolve(reference.player_name, reference.team_shortname) else {
            let warning = PlayWarning::UnresolvedPlayReference {
                play_id: play.play_id,
                player: reference.player_name.to_string(),
                team: reference.team_shortname.to_string(),
            };
            warn!("{}", warning);
            return PlayOutcome::Warning(warning);
        };

        let rules = &self.rules;
        let board = match side {
            Side::Away => &mut self.away,
            Side::Home => &mut self.home,
        };
        let Some(player) = board.player_by_name_mut(reference.player_name) else {
            // resolve() only returns a side holding the player
            return PlayOutcome::Warning(PlayWarning::UnresolvedPlayReference {
                play_id: play.play_id,
                player: reference.player_name.to_string(),
                team: reference.team_shortname.to_string(),
            });
        };
        let player_name = player.name.clone();

        match player.add_play(play.play_id, sub_event, &play.clock, play.period, rules) {
            PlayApplication::Duplicate(_) => PlayOutcome::Duplicate {
                side,
                player: player_name,
            },
            PlayApplication::Recorded { matched, .. } if matched.is_empty() => {
                let warning = PlayWarning::UnmatchedPlayText {
                    player: player_name,
                    text: sub_event.to_string(),
                };
                warn!("{}", warning);
                PlayOutcome::Warning(warning)
            }
            PlayApplication::Recorded { matched, .. } => PlayOutcome::Applied {
                side,
                player: player_name,
                matched,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Player;

    fn game() -> Game {
        let away = Scoreboard::new(
            "Away U",
            vec![Player::new("John Doe"), Player::new("Sam Twin")],
        );
        let home = Scoreboard::new(
            "Home State",
            vec![Player::new("Jane Roe"), Player::new("Sam Twin")],
        );
        Game::new(away, home)
    }

    fn raw(id: u64, text: &str) -> RawPlay {
        RawPlay {
            play_id: id,
            text: text.to_string(),
            clock: "10:00".to_string(),
            period: 1,
        }
    }

    fn player<'a>(game: &'a Game, side: Side, name: &str) -> &'a crate::models::Player {
        game.scoreboard(side).player_by_name(name).unwrap()
    }

    #[test]
    fn test_made_layup_scenario() {
        let mut game = game();
        let outcomes = game.submit(&raw(1, "John Doe(ABC) made Layup"));

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], PlayOutcome::Applied { .. }));
        let doe = player(&game, Side::Away, "John Doe");
        assert_eq!(doe.stat(StatCounter::FieldGoalsMade), 1);
        assert_eq!(doe.stat(StatCounter::FieldGoalsAttempted), 1);
        assert_eq!(game.away().team_shortname.as_deref(), Some("ABC"));
        assert!(game.home().team_shortname.is_none());
    }

    #[test]
    fn test_resubmission_is_idempotent() {
        let mut game = game();
        let play = raw(1, "John Doe(ABC) made Layup, Jane Roe(XYZ) Foul personal");
        game.submit(&play);
        let again = game.submit(&play);

        assert!(again
            .iter()
            .all(|o| matches!(o, PlayOutcome::Duplicate { .. })));
        let doe = player(&game, Side::Away, "John Doe");
        assert_eq!(doe.plays.len(), 1);
        assert_eq!(doe.stat(StatCounter::FieldGoalsMade), 1);
        assert_eq!(doe.stat(StatCounter::Points), 2);
        let roe = player(&game, Side::Home, "Jane Roe");
        assert_eq!(roe.plays.len(), 1);
        assert_eq!(roe.stat(StatCounter::Fouls), 1);
    }

    #[test]
    fn test_sub_events_attributed_separately() {
        let mut game = game();
        game.submit(&raw(4, "John Doe(ABC) made Jump Shot, Jane Roe(XYZ) Block"));

        let doe = player(&game, Side::Away, "John Doe");
        assert_eq!(doe.stat(StatCounter::FieldGoalsMade), 1);
        assert_eq!(doe.stat(StatCounter::Blocks), 0);
        assert_eq!(doe.plays[0].play_text, "John Doe(ABC) made Jump Shot");

        let roe = player(&game, Side::Home, "Jane Roe");
        assert_eq!(roe.stat(StatCounter::Blocks), 1);
        assert_eq!(roe.stat(StatCounter::FieldGoalsMade), 0);
        assert_eq!(game.home().team_shortname.as_deref(), Some("XYZ"));
    }

    #[test]
    fn test_shorthand_binding_is_stable() {
        let mut game = game();
        // First reference binds XYZ to the home roster
        game.submit(&raw(1, "Jane Roe(XYZ) Assist"));
        assert_eq!(game.home().team_shortname.as_deref(), Some("XYZ"));

        // Sam Twin exists on both rosters; XYZ must stay with home
        game.submit(&raw(2, "Sam Twin(XYZ) Steal"));
        assert_eq!(player(&game, Side::Home, "Sam Twin").stat(StatCounter::Steals), 1);
        assert_eq!(player(&game, Side::Away, "Sam Twin").stat(StatCounter::Steals), 0);
        assert!(game.away().team_shortname.is_none());
    }

    #[test]
    fn test_bound_team_does_not_fall_back() {
        let mut game = game();
        game.submit(&raw(1, "John Doe(ABC) Assist"));

        // Jane Roe plays for home, but ABC is bound to away
        let outcomes = game.submit(&raw(2, "Jane Roe(ABC) Steal"));
        assert!(matches!(
            outcomes.as_slice(),
            [PlayOutcome::Warning(PlayWarning::UnresolvedPlayReference { .. })]
        ));
        assert_eq!(player(&game, Side::Home, "Jane Roe").plays.len(), 0);
        assert!(game.home().team_shortname.is_none());
    }

    #[test]
    fn test_unknown_player_is_dropped() {
        let mut game = game();
        let outcomes = game.submit(&raw(1, "Nobody Here(QQQ) made Layup"));
        assert_eq!(
            outcomes,
            vec![PlayOutcome::Warning(PlayWarning::UnresolvedPlayReference {
                play_id: 1,
                player: "Nobody Here".into(),
                team: "QQQ".into(),
            })]
        );
        assert!(game.away().team_shortname.is_none());
        assert!(game.home().team_shortname.is_none());
    }

    #[test]
    fn test_unmatched_text_is_recorded_with_warning() {
        let mut game = game();
        let outcomes = game.submit(&raw(1, "John Doe(ABC) Substitution in"));
        assert!(matches!(
            outcomes.as_slice(),
            [PlayOutcome::Warning(PlayWarning::UnmatchedPlayText { .. })]
        ));
        assert_eq!(player(&game, Side::Away, "John Doe").plays.len(), 1);
    }

    #[test]
    fn test_team_level_play_has_no_outcomes() {
        let mut game = game();
        assert!(game.submit(&raw(1, "Timeout media")).is_empty());
    }
}
