//! Periodic box-score summary lines for the log.

use rebound_core::{Scoreboard, StatCounter};

const SUMMARY_COUNTERS: [StatCounter; 8] = [
    StatCounter::Points,
    StatCounter::FieldGoalsMade,
    StatCounter::FieldGoalsAttempted,
    StatCounter::ThreePointFieldGoalsMade,
    StatCounter::TotalRebounds,
    StatCounter::Assists,
    StatCounter::Turnovers,
    StatCounter::Fouls,
];

fn stat_columns(value: impl Fn(StatCounter) -> u32) -> String {
    SUMMARY_COUNTERS
        .iter()
        .map(|c| format!("{}={}", c.header(), value(*c)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One line for the team total, then one per player who has logged a play
pub fn scoreboard_lines(board: &Scoreboard) -> Vec<String> {
    let team = match &board.team_shortname {
        Some(short) => format!("{} ({})", board.team_name, short),
        None => board.team_name.clone(),
    };

    let mut lines = vec![format!(
        "{}: {}",
        team,
        stat_columns(|c| board.team_total(c))
    )];
    lines.extend(
        board
            .players
            .iter()
            .filter(|p| !p.plays.is_empty())
            .map(|p| {
                format!(
                    "  #{:<3} {:<24} {} plays={}",
                    p.number,
                    p.name,
                    stat_columns(|c| p.stat(c)),
                    p.plays.len()
                )
            }),
    );
    lines
}
