//! Play text tokenizer.
//!
//! Pulls `Name(TEAM)` references out of a play fragment, e.g.
//! `"Jane Roe(ABC) made Jump Shot"` yields `("Jane Roe", "ABC")`.

use regex::Regex;
use std::sync::OnceLock;

static REFERENCE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn reference_pattern() -> &'static Regex {
    REFERENCE_PATTERN.get_or_init(|| {
        Regex::new(r"(?P<player_name>[A-Za-z\s]+)\((?P<team_shortname>[A-Z]+)\)")
            .expect("reference pattern is valid")
    })
}

/// A `(player name, team shorthand)` pair found in play text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayReference<'t> {
    pub player_name: &'t str,
    pub team_shortname: &'t str,
}

/// Lazy iterator over the references in one fragment.
///
/// Cheap to clone; a clone resumes from the same position. Call
/// [`parse_references`] again to start over.
#[derive(Debug, Clone)]
pub struct PlayReferences<'t> {
    text: &'t str,
    pos: usize,
}

impl<'t> Iterator for PlayReferences<'t> {
    type Item = PlayReference<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos <= self.text.len() {
            let caps = reference_pattern().captures_at(self.text, self.pos)?;
            let whole = caps.get(0)?;
            self.pos = whole.end();

            let player_name = caps.name("player_name")?.as_str().trim();
            let team_shortname = caps.name("team_shortname")?.as_str();
            if player_name.is_empty() {
                continue;
            }
            return Some(PlayReference {
                player_name,
                team_shortname,
            });
        }
        None
    }
}

/// Find every `Name(TEAM)` reference in a play fragment
pub fn parse_references(text: &str) -> PlayReferences<'_> {
    PlayReferences { text, pos: 0 }
}

/// Split a play into its comma-delimited sub-events
pub fn split_sub_events(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|s| !s.is_empty())
}
