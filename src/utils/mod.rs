use chrono::{DateTime, Utc};

/// Decimal odds to two places, e.g. `3.00`.
pub fn format_odds(odds: f64) -> String {
    format!("{:.2}", odds)
}

/// Probability (0..1) as a percentage with `decimals` places.
pub fn format_probability(probability: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, probability * 100.0)
}

/// Signed EV as a percentage, e.g. `+4.2%` / `-1.0%`.
pub fn format_ev(ev: f64) -> String {
    format!("{:+.1}%", ev * 100.0)
}

pub fn format_money(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Kick-off time in the short form used on match cards, e.g. `Mar 1, 15:00`.
pub fn format_kickoff(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %H:%M").to_string()
}

/// Implied probability of decimal odds.
pub fn odds_to_probability(odds: f64) -> f64 {
    if odds <= 1.0 {
        return 1.0;
    }
    1.0 / odds
}

/// Odds cell for a match card: the price, or `N/A` when the feed has none.
pub fn format_optional_odds(odds: Option<f64>) -> String {
    odds.map(format_odds).unwrap_or_else(|| "N/A".to_string())
}
