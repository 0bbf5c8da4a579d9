//! Snapshot normalization from raw scoreboard observations
//!
//! One `RawObservation` is whatever the telemetry source managed to read off
//! the scoreboard on one polling tick. Normalization turns it into a
//! structured `Snapshot`; missing or garbled fields degrade to `None` rather
//! than failing the tick.

use serde::{Deserialize, Serialize};

/// Card outcome symbols for the 6-card game.
///
/// The outcome is never read from a card image. It is derived solely from the
/// numeric runs value (or the wicket glyph) via a fixed total mapping:
/// `0→Ten, 1→Ace, 2→Two, 3→Three, 4→Four, 6→Six, wicket→King`. Any other
/// runs value is `Unknown`, which propagates through the pipeline instead of
/// aborting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardOutcome {
    /// 10 card, dot ball (0 runs)
    #[serde(rename = "10")]
    Ten,
    /// Ace, 1 run
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    /// 4 card, boundary
    #[serde(rename = "4")]
    Four,
    /// 6 card, six
    #[serde(rename = "6")]
    Six,
    /// King, wicket
    #[serde(rename = "K")]
    King,
    #[serde(rename = "?")]
    Unknown,
}

impl CardOutcome {
    /// Derive the card from a numeric runs value.
    pub fn from_runs(runs: i64) -> Self {
        match runs {
            0 => CardOutcome::Ten,
            1 => CardOutcome::Ace,
            2 => CardOutcome::Two,
            3 => CardOutcome::Three,
            4 => CardOutcome::Four,
            6 => CardOutcome::Six,
            _ => CardOutcome::Unknown,
        }
    }

    /// Derive the card from a ball-by-ball glyph. Wicket markers win over the
    /// text; "W" and "ww" are the wicket text variants the scoreboard uses.
    pub fn from_glyph(text: &str, is_wicket: bool) -> Self {
        let trimmed = text.trim();
        if is_wicket || trimmed == "W" || trimmed.eq_ignore_ascii_case("ww") {
            return CardOutcome::King;
        }
        match trimmed.parse::<i64>() {
            Ok(runs) => CardOutcome::from_runs(runs),
            Err(_) => CardOutcome::Unknown,
        }
    }

    /// Parse a card symbol as it appears in persisted records.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "10" => Some(CardOutcome::Ten),
            "A" => Some(CardOutcome::Ace),
            "2" => Some(CardOutcome::Two),
            "3" => Some(CardOutcome::Three),
            "4" => Some(CardOutcome::Four),
            "6" => Some(CardOutcome::Six),
            "K" => Some(CardOutcome::King),
            "?" => Some(CardOutcome::Unknown),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CardOutcome::Ten => "10",
            CardOutcome::Ace => "A",
            CardOutcome::Two => "2",
            CardOutcome::Three => "3",
            CardOutcome::Four => "4",
            CardOutcome::Six => "6",
            CardOutcome::King => "K",
            CardOutcome::Unknown => "?",
        }
    }

    /// Runs scored by this card; `None` for a wicket or an unknown card.
    pub fn runs(&self) -> Option<u32> {
        match self {
            CardOutcome::Ten => Some(0),
            CardOutcome::Ace => Some(1),
            CardOutcome::Two => Some(2),
            CardOutcome::Three => Some(3),
            CardOutcome::Four => Some(4),
            CardOutcome::Six => Some(6),
            CardOutcome::King | CardOutcome::Unknown => None,
        }
    }

    pub fn is_wicket(&self) -> bool {
        matches!(self, CardOutcome::King)
    }
}

/// One ball glyph as scraped from the ball-by-ball strip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBallGlyph {
    pub text: String,
    #[serde(default)]
    pub is_four: bool,
    #[serde(default)]
    pub is_six: bool,
    #[serde(default)]
    pub is_wicket: bool,
}

/// One team row as scraped: display name plus the raw score text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTeamRow {
    pub name: String,
    pub score: String,
}

/// One opaque scoreboard observation from the telemetry source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObservation {
    #[serde(default)]
    pub round_id: Option<String>,
    #[serde(default)]
    pub teams: Vec<RawTeamRow>,
    /// Ball-by-ball strip, oldest first; the last entry is the most recent ball.
    #[serde(default)]
    pub balls: Vec<RawBallGlyph>,
    #[serde(default)]
    pub status_text: Option<String>,
}

/// Parsed score line for one team, e.g. `"39-1 (3.0)"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamScore {
    pub name: String,
    pub runs: u32,
    pub wickets: u32,
    pub over: u32,
    pub ball: u32,
    /// Original score text, kept for structural score-change comparison and
    /// for the persisted record contract.
    pub score_text: String,
}

impl TeamScore {
    /// Parse `"39-1 (3.0)"`-shaped score text. Returns `None` if any field
    /// is missing or non-numeric.
    pub fn parse(name: &str, score_text: &str) -> Option<Self> {
        let text = score_text.trim();
        let (score_part, rest) = text.split_once('(')?;
        let (runs_str, wickets_str) = score_part.trim().split_once('-')?;
        let runs = runs_str.trim().parse::<u32>().ok()?;
        let wickets = wickets_str.trim().parse::<u32>().ok()?;

        let overs_part = rest.split(')').next()?.trim();
        let (over_str, ball_str) = overs_part.split_once('.')?;
        let over = over_str.trim().parse::<u32>().ok()?;
        let ball = ball_str.trim().parse::<u32>().ok()?;

        Some(Self {
            name: name.trim().to_string(),
            runs,
            wickets,
            over,
            ball,
            score_text: text.to_string(),
        })
    }

    /// Total balls faced, the authoritative progress counter.
    pub fn total_balls(&self) -> u32 {
        self.over * 6 + self.ball
    }
}

/// Structured view of one scoreboard observation.
///
/// A snapshot with neither team row present is the "no data" sentinel the
/// state machine treats as a waiting/parse-failure tick.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub round_id: Option<String>,
    pub team1: Option<TeamScore>,
    pub team2: Option<TeamScore>,
    /// Outcome of the most recent ball, derived from the newest glyph.
    pub last_ball: Option<CardOutcome>,
    pub status_text: Option<String>,
}

impl Snapshot {
    /// Normalize one raw observation. Never fails: unparseable team rows
    /// become `None` and an empty glyph strip yields no last-ball outcome.
    pub fn normalize(obs: &RawObservation) -> Self {
        let team1 = obs
            .teams
            .first()
            .and_then(|row| TeamScore::parse(&row.name, &row.score));
        let team2 = obs
            .teams
            .get(1)
            .and_then(|row| TeamScore::parse(&row.name, &row.score));

        let last_ball = obs
            .balls
            .last()
            .map(|glyph| CardOutcome::from_glyph(&glyph.text, glyph.is_wicket));

        Self {
            round_id: obs.round_id.clone(),
            team1,
            team2,
            last_ball,
            status_text: obs.status_text.clone(),
        }
    }

    /// True when both teams' score rows are visible, the condition that moves
    /// the state machine from Waiting to Active.
    pub fn has_score_rows(&self) -> bool {
        self.team1.is_some() && self.team2.is_some()
    }

    /// Score texts as a structural pair, used for score-change detection.
    pub fn score_pair(&self) -> (Option<&str>, Option<&str>) {
        (
            self.team1.as_ref().map(|t| t.score_text.as_str()),
            self.team2.as_ref().map(|t| t.score_text.as_str()),
        )
    }
}
