use crate::models::{Candidate, MarketBucket, MarketKey};

/// Rule table, evaluated top to bottom. A candidate lands in the first market
/// whose predicate accepts its event text.
const RULES: [(MarketKey, fn(&str, &str) -> bool); 4] = [
    (MarketKey::MatchResult, is_match_result),
    (MarketKey::Goals, is_goals),
    (MarketKey::Btts, is_btts),
    (MarketKey::Corners, is_corners),
];

fn is_match_result(raw: &str, lower: &str) -> bool {
    // "win" is matched only as written ("Win"/"win"), "draw" in any case
    raw.contains("Win") || raw.contains("win") || lower.contains("draw")
}

fn is_goals(raw: &str, lower: &str) -> bool {
    // "over"/"under" also appear in corner and card lines; those belong to corners
    (lower.contains("goal") || lower.contains("over") || lower.contains("under"))
        && !mentions_btts(lower)
        && !is_corners(raw, lower)
}

fn is_btts(_raw: &str, lower: &str) -> bool {
    mentions_btts(lower)
}

fn is_corners(_raw: &str, lower: &str) -> bool {
    lower.contains("corner") || lower.contains("card") || lower.contains("booking")
}

fn mentions_btts(lower: &str) -> bool {
    lower.contains("btts") || lower.contains("both teams")
}

/// Market a single event text belongs to, if any.
pub fn market_for(event: &str) -> Option<MarketKey> {
    let lower = event.to_lowercase();
    RULES
        .iter()
        .find(|(_, accepts)| accepts(event, &lower))
        .map(|(key, _)| *key)
}

/// Result of a classification pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// All four markets in display order, including empty ones.
    pub buckets: Vec<MarketBucket>,
    /// Candidates no rule accepted. Never rendered.
    pub unclassified: Vec<Candidate>,
}

impl Classification {
    /// Markets that have at least one bet.
    pub fn visible(&self) -> impl Iterator<Item = &MarketBucket> {
        self.buckets.iter().filter(|b| !b.bets.is_empty())
    }

    pub fn bucket(&self, key: MarketKey) -> Option<&MarketBucket> {
        self.buckets.iter().find(|b| b.key == key)
    }
}

/// Stable partition of `candidates` into the four markets.
pub fn classify(candidates: &[Candidate]) -> Classification {
    let mut buckets: Vec<MarketBucket> = MarketKey::ORDERED
        .iter()
        .map(|key| MarketBucket::empty(*key))
        .collect();
    let mut unclassified = Vec::new();

    for candidate in candidates {
        match market_for(&candidate.event) {
            Some(key) => {
                if let Some(bucket) = buckets.iter_mut().find(|b| b.key == key) {
                    bucket.bets.push(candidate.clone());
                }
            }
            None => unclassified.push(candidate.clone()),
        }
    }

    if !unclassified.is_empty() {
        tracing::debug!(
            "{} prediction(s) matched no market and were dropped",
            unclassified.len()
        );
    }

    Classification {
        buckets,
        unclassified,
    }
}
