use crate::models::{Leg, ParlaySummary};

/// Reference stake the payout is quoted against.
pub const DEFAULT_UNIT_STAKE: f64 = 10.0;

/// Combine legs under an independence assumption.
///
/// An empty slip yields all-zero odds, probability and payout rather than the
/// multiplicative identity, so "nothing selected" never reads as even money.
pub fn combine(legs: &[Leg], stake: f64) -> ParlaySummary {
    if legs.is_empty() {
        return ParlaySummary {
            combined_odds: 0.0,
            combined_prob: 0.0,
            leg_count: 0,
            stake,
            payout: 0.0,
            expected_return: 0.0,
        };
    }

    let combined_odds: f64 = legs.iter().map(|l| l.odds).product();
    let combined_prob: f64 = legs.iter().map(|l| l.prob).product();

    ParlaySummary {
        combined_odds,
        combined_prob,
        leg_count: legs.len(),
        stake,
        payout: combined_odds * stake,
        expected_return: combined_prob * combined_odds - 1.0,
    }
}
