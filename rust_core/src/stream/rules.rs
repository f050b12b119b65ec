//! Stat rule table.
//!
//! An ordered list of `(counter, predicate, increment)` entries. Every entry
//! is checked against the play text, so one play can move several counters:
//! a made three bumps FGM, FGA, 3FGM, 3FGA and PTS in one pass.

use crate::models::{StatCounter, StatLine};
use regex::{Regex, RegexBuilder};

const SHOT: &str = r"jump ?shot|jumper|layup|dunk|tip[ -]?in|hook ?shot|alley[ -]?oop|fade ?away|2pt|3pt|three[ -]point";
const THREE: &str = r"3pt|three[ -]point";
const MADE: &str = r"\bmade\b";
const ATTEMPT: &str = r"\b(?:made|missed)\b";
const FREE_THROW: &str = r"free ?throw";
const OFFENSIVE_REBOUND: &str = r"offensive rebound|rebound offensive";
const DEFENSIVE_REBOUND: &str = r"defensive rebound|rebound defensive";
const REBOUND: &str = r"rebound";
const DEADBALL: &str = r"deadball";
const ASSIST: &str = r"assist";
const TURNOVER: &str = r"turnover";
const STEAL: &str = r"\bsteal";
const BLOCK: &str = r"\bblock\b";
const FOUL: &str = r"\bfoul\b";
const DISQUALIFICATION: &str = r"disqualif|ejected";
const TECHNICAL: &str = r"technical";

/// A case-insensitive text term.
///
/// This is the only place the rule table touches the pattern engine.
#[derive(Debug, Clone)]
pub struct Term(Regex);

impl Term {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Term)
    }

    pub fn matches(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

#[derive(Debug, Clone)]
pub struct StatRule {
    pub counter: StatCounter,
    pub increment: u32,
    all_of: Vec<Term>,
    none_of: Vec<Term>,
}

impl StatRule {
    /// Fires when every `all_of` term and no `none_of` term is found
    pub fn new(counter: StatCounter, increment: u32, all_of: &[&str], none_of: &[&str]) -> Self {
        let compile = |patterns: &[&str]| {
            patterns
                .iter()
                .map(|p| Term::new(p).expect("stat rule patterns are valid"))
                .collect()
        };
        Self {
            counter,
            increment,
            all_of: compile(all_of),
            none_of: compile(none_of),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.all_of.iter().all(|t| t.matches(text)) && !self.none_of.iter().any(|t| t.matches(text))
    }
}

#[derive(Debug, Clone)]
pub struct StatRules {
    rules: Vec<StatRule>,
}

impl StatRules {
    pub fn new(rules: Vec<StatRule>) -> Self {
        Self { rules }
    }

    /// The box-score rule table
    pub fn standard() -> Self {
        use StatCounter::*;

        Self::new(vec![
            StatRule::new(FieldGoalsMade, 1, &[SHOT, MADE], &[]),
            StatRule::new(FieldGoalsAttempted, 1, &[SHOT, ATTEMPT], &[]),
            StatRule::new(ThreePointFieldGoalsMade, 1, &[THREE, MADE], &[]),
            StatRule::new(ThreePointFieldGoalsAttempted, 1, &[THREE, ATTEMPT], &[]),
            StatRule::new(FreeThrowsMade, 1, &[FREE_THROW, MADE], &[]),
            StatRule::new(FreeThrowsAttempted, 1, &[FREE_THROW, ATTEMPT], &[]),
            StatRule::new(Points, 1, &[FREE_THROW, MADE], &[]),
            StatRule::new(Points, 2, &[SHOT, MADE], &[THREE]),
            StatRule::new(Points, 3, &[THREE, MADE], &[]),
            StatRule::new(OffensiveRebounds, 1, &[OFFENSIVE_REBOUND], &[]),
            StatRule::new(DefensiveRebounds, 1, &[DEFENSIVE_REBOUND], &[]),
            StatRule::new(TotalRebounds, 1, &[REBOUND], &[DEADBALL]),
            StatRule::new(Assists, 1, &[ASSIST], &[]),
            StatRule::new(Turnovers, 1, &[TURNOVER], &[]),
            StatRule::new(Steals, 1, &[STEAL], &[]),
            StatRule::new(Blocks, 1, &[BLOCK], &[]),
            StatRule::new(Fouls, 1, &[FOUL], &[]),
            StatRule::new(Disqualifications, 1, &[DISQUALIFICATION], &[]),
            StatRule::new(TechnicalFouls, 1, &[TECHNICAL], &[]),
        ])
    }

    /// Run every rule against `text`, bumping `stats` for each hit.
    ///
    /// Returns the counters that moved, in table order, without repeats.
    pub fn apply(&self, text: &str, stats: &mut StatLine) -> Vec<StatCounter> {
        let mut matched = Vec::new();
        for rule in self.rules.iter().filter(|r| r.matches(text)) {
            stats.increment(rule.counter, rule.increment);
            if !matched.contains(&rule.counter) {
                matched.push(rule.counter);
            }
        }
        matched
    }
}

impl Default for StatRules {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StatCounter::*;

    fn run(text: &str) -> (StatLine, Vec<StatCounter>) {
        let mut line = StatLine::new();
        let matched = StatRules::standard().apply(text, &mut line);
        (line, matched)
    }

    #[test]
    fn test_made_layup_counts_make_and_attempt() {
        let (line, matched) = run("Doe(ABC) made Layup");
        assert_eq!(matched, vec![FieldGoalsMade, FieldGoalsAttempted, Points]);
        assert_eq!(line.get(FieldGoalsMade), 1);
        assert_eq!(line.get(FieldGoalsAttempted), 1);
        assert_eq!(line.get(Points), 2);
    }

    #[test]
    fn test_made_three() {
        let (line, _) = run("Doe(ABC) made 3pt Jump Shot");
        assert_eq!(line.get(FieldGoalsMade), 1);
        assert_eq!(line.get(FieldGoalsAttempted), 1);
        assert_eq!(line.get(ThreePointFieldGoalsMade), 1);
        assert_eq!(line.get(ThreePointFieldGoalsAttempted), 1);
        assert_eq!(line.get(Points), 3);
    }

    #[test]
    fn test_missed_jump_shot_is_attempt_only() {
        let (line, matched) = run("Doe(ABC) missed Jump Shot");
        assert_eq!(matched, vec![FieldGoalsAttempted]);
        assert_eq!(line.get(FieldGoalsMade), 0);
        assert_eq!(line.get(Points), 0);
    }

    #[test]
    fn test_free_throws() {
        let (made, _) = run("Doe(ABC) Free Throw made");
        assert_eq!(made.get(FreeThrowsMade), 1);
        assert_eq!(made.get(FreeThrowsAttempted), 1);
        assert_eq!(made.get(Points), 1);
        assert_eq!(made.get(FieldGoalsAttempted), 0);

        let (missed, _) = run("Doe(ABC) free throw missed");
        assert_eq!(missed.get(FreeThrowsMade), 0);
        assert_eq!(missed.get(FreeThrowsAttempted), 1);
        assert_eq!(missed.get(Points), 0);
    }

    #[test]
    fn test_rebounds() {
        let (off, _) = run("Doe(ABC) Offensive Rebound");
        assert_eq!(off.get(OffensiveRebounds), 1);
        assert_eq!(off.get(DefensiveRebounds), 0);
        assert_eq!(off.get(TotalRebounds), 1);

        let (def, _) = run("Doe(ABC) rebound defensive");
        assert_eq!(def.get(DefensiveRebounds), 1);
        assert_eq!(def.get(TotalRebounds), 1);

        let (dead, matched) = run("Doe(ABC) rebound deadball");
        assert_eq!(dead.get(TotalRebounds), 0);
        assert!(matched.is_empty());
    }

    #[test]
    fn test_fouls() {
        let (personal, _) = run("Doe(ABC) Foul personal");
        assert_eq!(personal.get(Fouls), 1);
        assert_eq!(personal.get(TechnicalFouls), 0);

        let (technical, matched) = run("Doe(ABC) foul technical");
        assert_eq!(matched, vec![Fouls, TechnicalFouls]);

        let (fouled, matched) = run("Doe(ABC) fouled");
        assert_eq!(fouled.get(Fouls), 0);
        assert!(matched.is_empty());
    }

    #[test]
    fn test_misc_counters() {
        for (text, counter) in [
            ("Doe(ABC) Assist", Assists),
            ("Doe(ABC) Turnover bad pass", Turnovers),
            ("Doe(ABC) Steal", Steals),
            ("Doe(ABC) Block", Blocks),
            ("Doe(ABC) disqualified", Disqualifications),
        ] {
            let (line, matched) = run(text);
            assert_eq!(line.get(counter), 1, "{text}");
            assert_eq!(matched, vec![counter], "{text}");
        }
    }

    #[test]
    fn test_blocked_shooter_gets_no_block() {
        let (shooter, matched) = run("Doe(ABC) 2pt layup blocked missed");
        assert_eq!(shooter.get(Blocks), 0);
        assert_eq!(matched, vec![FieldGoalsAttempted]);

        let (blocker, _) = run("Roe(XYZ) block");
        assert_eq!(blocker.get(Blocks), 1);
    }

    #[test]
    fn test_case_insensitive() {
        let (line, _) = run("DOE(ABC) MADE DUNK");
        assert_eq!(line.get(FieldGoalsMade), 1);
    }

    #[test]
    fn test_unmatched_text() {
        let (line, matched) = run("Doe(ABC) substitution out");
        assert!(matched.is_empty());
        assert!(line.iter().all(|(_, v)| v == 0));
    }
}
