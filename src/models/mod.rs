use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ── Leagues ──────────────────────────────────────────────────────────────────

/// League filter offered to the user. `All` asks the backend for every
/// supported competition at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum League {
    #[default]
    All,
    PremierLeague,
    LaLiga,
    Bundesliga,
    SerieA,
    Ligue1,
}

impl League {
    pub const EVERY: [League; 6] = [
        League::All,
        League::PremierLeague,
        League::LaLiga,
        League::Bundesliga,
        League::SerieA,
        League::Ligue1,
    ];

    /// Code understood by the backend (`league=` query parameter).
    pub fn code(&self) -> &'static str {
        match self {
            League::All => "ALL",
            League::PremierLeague => "PL",
            League::LaLiga => "PD",
            League::Bundesliga => "BL1",
            League::SerieA => "SA",
            League::Ligue1 => "FL1",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            League::All => "All Leagues",
            League::PremierLeague => "Premier League",
            League::LaLiga => "La Liga",
            League::Bundesliga => "Bundesliga",
            League::SerieA => "Serie A",
            League::Ligue1 => "Ligue 1",
        }
    }

    /// Short country tag shown on the filter buttons.
    pub fn display(&self) -> &'static str {
        match self {
            League::All => "ALL",
            League::PremierLeague => "ENG",
            League::LaLiga => "ESP",
            League::Bundesliga => "GER",
            League::SerieA => "ITA",
            League::Ligue1 => "FRA",
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for League {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        League::EVERY
            .into_iter()
            .find(|l| l.code() == wanted || l.display() == wanted)
            .ok_or_else(|| format!("unknown league code: {}", s))
    }
}

// ── Matches ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub competition: String,
    /// Outcome label → decimal price, when the backend could attach odds.
    #[serde(default)]
    pub odds: Option<HashMap<String, f64>>,
}

impl Match {
    /// First positive price found under any of `labels`.
    fn price_for(&self, labels: &[&str]) -> Option<f64> {
        let odds = self.odds.as_ref()?;
        labels
            .iter()
            .filter_map(|label| odds.get(*label).copied())
            .find(|price| *price > 0.0)
    }

    pub fn home_odds(&self) -> Option<f64> {
        self.price_for(&["Home", "1"])
    }

    pub fn draw_odds(&self) -> Option<f64> {
        self.price_for(&["Draw", "X"])
    }

    pub fn away_odds(&self) -> Option<f64> {
        self.price_for(&["Away", "2"])
    }
}

/// football-data.org ids are integers, other feeds use strings.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

// ── Predictions ──────────────────────────────────────────────────────────────

/// One model-generated betting outcome for a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub event: String,
    pub prob: f64,
    pub odds: f64,
    #[serde(default)]
    pub ev: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Candidate {
    /// Backend EV, with a missing value read as zero.
    pub fn expected_value(&self) -> f64 {
        self.ev.unwrap_or(0.0)
    }

    pub fn is_value(&self) -> bool {
        self.expected_value() > 0.0
    }
}

/// A candidate that has been added to the parlay.
pub type Leg = Candidate;

// ── Markets ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MarketKey {
    #[serde(rename = "match-result")]
    MatchResult,
    #[serde(rename = "goals")]
    Goals,
    #[serde(rename = "btts")]
    Btts,
    #[serde(rename = "corners")]
    Corners,
}

impl MarketKey {
    /// Buckets in display (and classification) order.
    pub const ORDERED: [MarketKey; 4] = [
        MarketKey::MatchResult,
        MarketKey::Goals,
        MarketKey::Btts,
        MarketKey::Corners,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MarketKey::MatchResult => "match-result",
            MarketKey::Goals => "goals",
            MarketKey::Btts => "btts",
            MarketKey::Corners => "corners",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MarketKey::MatchResult => "Match Result",
            MarketKey::Goals => "Goals",
            MarketKey::Btts => "Both Teams To Score",
            MarketKey::Corners => "Corners & Cards",
        }
    }
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketBucket {
    pub key: MarketKey,
    pub title: &'static str,
    pub bets: Vec<Candidate>,
}

impl MarketBucket {
    pub fn empty(key: MarketKey) -> Self {
        Self {
            key,
            title: key.title(),
            bets: Vec::new(),
        }
    }
}

// ── Parlay ───────────────────────────────────────────────────────────────────

/// Derived view of the current legs. Never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParlaySummary {
    pub combined_odds: f64,
    pub combined_prob: f64,
    pub leg_count: usize,
    pub stake: f64,
    /// `combined_odds × stake`.
    pub payout: f64,
    /// `combined_prob × combined_odds − 1`, the return per unit staked.
    pub expected_return: f64,
}

// ── Wire types ───────────────────────────────────────────────────────────────

/// Context sent alongside a prediction request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionContext {
    pub real_match_id: String,
    pub odds_data: OddsContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OddsContext {
    pub home_odds: f64,
    pub away_odds: f64,
    #[serde(skip)]
    pub home_fallback: bool,
    #[serde(skip)]
    pub away_fallback: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchesResponse {
    #[serde(default)]
    pub matches: Vec<Match>,
}

#[derive(Debug, Serialize)]
pub struct PredictionRequest<'a> {
    pub match_id: &'a str,
    pub home_team: &'a str,
    pub away_team: &'a str,
    pub context: &'a PredictionContext,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}
