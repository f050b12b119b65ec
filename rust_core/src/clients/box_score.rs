//! Box-score page source and roster parsing.
//!
//! The page gives two things: the session cookies needed to open the
//! livestream, and the two team rosters the play feed is attributed against.

use crate::clients::http::HttpClient;
use crate::error::{BootstrapError, FetchError};
use crate::models::{Player, Scoreboard, StatCounter};
use async_trait::async_trait;
use reqwest::header::SET_COOKIE;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Raw box-score response
#[derive(Debug, Clone, Default)]
pub struct BoxScorePage {
    /// Every `Set-Cookie` header value, in response order
    pub set_cookies: Vec<String>,
    pub body: String,
}

#[async_trait]
pub trait BoxScoreSource: Send + Sync {
    async fn fetch_box_score(&self, game_id: u64) -> Result<BoxScorePage, FetchError>;
}

/// Fetches `{base_url}/{game_id}/box_score` over HTTP
#[derive(Debug, Clone)]
pub struct HttpBoxScoreSource {
    http: HttpClient,
    base_url: String,
}

impl HttpBoxScoreSource {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn box_score_url(&self, game_id: u64) -> String {
        format!("{}/{}/box_score", self.base_url.trim_end_matches('/'), game_id)
    }
}

#[async_trait]
impl BoxScoreSource for HttpBoxScoreSource {
    async fn fetch_box_score(&self, game_id: u64) -> Result<BoxScorePage, FetchError> {
        let url = self.box_score_url(game_id);
        let resp = self.http.get(&url, &[], &[]).await?;

        let set_cookies = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let body = resp
            .text()
            .await
            .map_err(|source| FetchError::Request { url, source })?;

        Ok(BoxScorePage { set_cookies, body })
    }
}

// ============================================================================
// Roster parsing
// ============================================================================

/// Roster table columns that describe the player rather than count stats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RosterField {
    Name,
    Number,
    Position,
    Starter,
    OnCourt,
    MinutesPlayed,
}

const ROSTER_HEADERS: [(&str, RosterField); 6] = [
    ("Name", RosterField::Name),
    ("#", RosterField::Number),
    ("Pos", RosterField::Position),
    ("Starter", RosterField::Starter),
    ("On Court", RosterField::OnCourt),
    ("MP", RosterField::MinutesPlayed),
];

fn roster_field(header: &str) -> Option<RosterField> {
    ROSTER_HEADERS
        .iter()
        .find(|(h, _)| *h == header)
        .map(|(_, field)| *field)
}

/// Box-score flags are rendered as `*` when set and blank otherwise
fn parse_flag(cell: &str) -> bool {
    match cell {
        "*" => true,
        "" => false,
        other => other.parse::<u32>().map(|n| n > 0).unwrap_or(false),
    }
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_player(headers: &[String], cells: &[String]) -> Option<Player> {
    let mut player = Player::new(String::new());

    for (header, cell) in headers.iter().zip(cells) {
        match roster_field(header) {
            Some(RosterField::Name) => player.name = cell.clone(),
            Some(RosterField::Number) => player.number = cell.clone(),
            Some(RosterField::Position) => player.position = cell.clone(),
            Some(RosterField::Starter) => player.starter = parse_flag(cell),
            Some(RosterField::OnCourt) => player.on_court = parse_flag(cell),
            Some(RosterField::MinutesPlayed) if !cell.is_empty() => {
                player.minutes_played = cell.clone()
            }
            Some(RosterField::MinutesPlayed) => {}
            // Counters start at zero and are driven by the play feed only
            None if StatCounter::from_header(header).is_some() => {}
            None => debug!("Ignoring roster column {:?}", header),
        }
    }

    (!player.name.is_empty()).then_some(player)
}

fn parse_scoreboard(container: ElementRef<'_>) -> Option<Scoreboard> {
    let team_sel = selector("span.d-none.d-sm-block");
    let img_sel = selector("img");
    let table_sel = selector(r#"table[id^="competitor_"]"#);
    let th_sel = selector("th");
    let tr_sel = selector("tr");
    let td_sel = selector("td");

    let table = container.select(&table_sel).next()?;
    let headers: Vec<String> = table.select(&th_sel).map(text_of).collect();

    let players = table
        .select(&tr_sel)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&td_sel).map(text_of).collect();
            if cells.is_empty() || cells.len() < headers.len() {
                return None;
            }
            parse_player(&headers, &cells)
        })
        .collect();

    let mut scoreboard = Scoreboard::new(
        container
            .select(&team_sel)
            .next()
            .map(text_of)
            .unwrap_or_default(),
        players,
    );
    scoreboard.team_logo_url = container
        .select(&img_sel)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string);

    Some(scoreboard)
}

/// Parse the `(away, home)` rosters from a box-score document
pub fn parse_scoreboards(html: &str) -> Result<(Scoreboard, Scoreboard), BootstrapError> {
    let document = Html::parse_document(html);
    let container_sel = selector("div.col.p-2");

    let mut boards = document.select(&container_sel).filter_map(parse_scoreboard);
    match (boards.next(), boards.next()) {
        (Some(away), Some(home)) => Ok((away, home)),
        (found, _) => Err(BootstrapError::Roster(format!(
            "expected two team rosters, found {}",
            usize::from(found.is_some())
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX_SCORE: &str = r#"
<html><body>
<div class="row">
  <div class="col p-2">
    <img src="/logos/away.png">
    <span class="d-none d-sm-block"> Away University </span>
    <table id="competitor_111">
      <thead><tr><th>#</th><th>Name</th><th>Pos</th><th>Starter</th><th>On Court</th><th>MP</th><th>FGM</th><th>PTS</th></tr></thead>
      <tbody>
        <tr><td>00</td><td>John Doe</td><td>G</td><td>*</td><td>*</td><td>12:30</td><td>4</td><td>9</td></tr>
        <tr><td>5</td><td> Sam
             Twin </td><td>F</td><td></td><td></td><td></td><td></td><td></td></tr>
        <tr><td colspan="8">Totals</td></tr>
      </tbody>
    </table>
  </div>
  <div class="col p-2">
    <span class="d-none d-sm-block">Home State</span>
    <table id="competitor_222">
      <tr><th>#</th><th>Name</th><th>Pos</th></tr>
      <tr><td>3</td><td>Jane Roe</td><td>C</td></tr>
    </table>
  </div>
</div>
</body></html>
"#;

    #[test]
    fn test_parse_two_rosters() {
        let (away, home) = parse_scoreboards(BOX_SCORE).unwrap();

        assert_eq!(away.team_name, "Away University");
        assert_eq!(away.team_logo_url.as_deref(), Some("/logos/away.png"));
        assert!(away.team_shortname.is_none());
        assert_eq!(away.players.len(), 2);

        let doe = &away.players[0];
        assert_eq!(doe.name, "John Doe");
        assert_eq!(doe.number, "00");
        assert_eq!(doe.position, "G");
        assert!(doe.starter);
        assert!(doe.on_court);
        assert_eq!(doe.minutes_played, "12:30");
        // page totals are not carried into the ledger
        assert_eq!(doe.stat(StatCounter::FieldGoalsMade), 0);
        assert_eq!(doe.stat(StatCounter::Points), 0);

        let twin = &away.players[1];
        assert_eq!(twin.name, "Sam Twin");
        assert!(!twin.starter);
        assert_eq!(twin.minutes_played, "0:00");

        assert_eq!(home.team_name, "Home State");
        assert!(home.team_logo_url.is_none());
        assert_eq!(home.players.len(), 1);
        assert_eq!(home.players[0].name, "Jane Roe");
    }

    #[test]
    fn test_missing_roster_is_an_error() {
        let err = parse_scoreboards("<html><body><p>Game not started</p></body></html>")
            .unwrap_err();
        assert!(matches!(err, BootstrapError::Roster(_)));
    }

    #[test]
    fn test_flags() {
        assert!(parse_flag("*"));
        assert!(parse_flag("1"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("0"));
    }

    #[test]
    fn test_box_score_url() {
        let source = HttpBoxScoreSource::new(
            HttpClient::new(Default::default()),
            "https://stats.example.org/contests/",
        );
        assert_eq!(
            source.box_score_url(42),
            "https://stats.example.org/contests/42/box_score"
        );
    }
}
