//! Session bootstrap: one box-score fetch yields both the livestream session
//! identity and the two rosters.

use crate::clients::box_score::{parse_scoreboards, BoxScoreSource};
use crate::error::BootstrapError;
use crate::models::{SessionContext, SportCode};
use crate::stream::aggregator::Game;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{info, warn};

fn user_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"livestream_user_id=([^;]+)").expect("valid regex"))
}

fn stats_session_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_stats_session=([^;]+)").expect("valid regex"))
}

fn first_capture(re: &Regex, set_cookies: &[String]) -> Option<String> {
    set_cookies
        .iter()
        .find_map(|cookie| re.captures(cookie))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Pull the user and session tokens out of `Set-Cookie` values.
///
/// Each token is looked up on its own; a missing one becomes the empty string.
pub fn extract_session_tokens(set_cookies: &[String]) -> SessionContext {
    let user_id = first_capture(user_id_re(), set_cookies).unwrap_or_else(|| {
        warn!("No livestream_user_id cookie in box score response");
        String::new()
    });
    let stats_session = first_capture(stats_session_re(), set_cookies).unwrap_or_else(|| {
        warn!("No _stats_session cookie in box score response");
        String::new()
    });
    SessionContext::new(user_id, stats_session)
}

/// Everything the livestream needs before the first connection
#[derive(Debug)]
pub struct Bootstrap {
    pub session: SessionContext,
    pub game: Game,
}

pub async fn bootstrap(
    source: &dyn BoxScoreSource,
    sport_code: SportCode,
    game_id: u64,
) -> Result<Bootstrap, BootstrapError> {
    let page = source.fetch_box_score(game_id).await?;
    let session = extract_session_tokens(&page.set_cookies);
    let (away, home) = parse_scoreboards(&page.body)?;

    info!(
        "Bootstrapped {} game {}: {} ({} players) at {} ({} players)",
        sport_code,
        game_id,
        away.team_name,
        away.players.len(),
        home.team_name,
        home.players.len()
    );

    Ok(Bootstrap {
        session,
        game: Game::new(away, home),
    })
}
