use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::services::DEFAULT_UNIT_STAKE;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Generous enough for the backend's first request on a cold match cache.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 14;

/// Client settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub unit_stake: f64,
    pub lookahead_days: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            unit_stake: DEFAULT_UNIT_STAKE,
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let api_url = lookup("PARLAY_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_url);

        Self {
            api_url,
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "PARLAY_HTTP_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            unit_stake: parse_or(&lookup, "PARLAY_UNIT_STAKE", defaults.unit_stake),
            lookahead_days: parse_or(&lookup, "PARLAY_LOOKAHEAD_DAYS", defaults.lookahead_days),
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Debug,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}={:?}, using default {:?}", key, raw, default);
            default
        }),
    }
}
