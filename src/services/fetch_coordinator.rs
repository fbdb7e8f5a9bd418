use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::api::PredictionBackend;
use crate::error::TransportError;
use crate::models::{League, Match, OddsContext, PredictionContext};
use crate::state::{Action, StateStore};

/// Home price sent when the match carries no `Home`/`1` odds.
pub const DEFAULT_HOME_ODDS: f64 = 2.0;
/// Away price sent when the match carries no `Away`/`2` odds.
pub const DEFAULT_AWAY_ODDS: f64 = 3.0;

/// Independently tracked asynchronous channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Matches,
    Predictions,
}

/// Identifies one issued request. Only the ticket carrying the slot's latest
/// generation may write its result into the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub slot: Slot,
    pub generation: u64,
}

/// Issues at most one live fetch per slot and drops responses that a newer
/// request has superseded, whatever order they arrive in.
pub struct SelectionFetchCoordinator<B: ?Sized> {
    backend: Arc<B>,
    lookahead_days: u32,
    matches_generation: AtomicU64,
    predictions_generation: AtomicU64,
}

impl<B: PredictionBackend + ?Sized> SelectionFetchCoordinator<B> {
    pub fn new(backend: Arc<B>, lookahead_days: u32) -> Self {
        Self {
            backend,
            lookahead_days,
            matches_generation: AtomicU64::new(0),
            predictions_generation: AtomicU64::new(0),
        }
    }

    fn counter(&self, slot: Slot) -> &AtomicU64 {
        match slot {
            Slot::Matches => &self.matches_generation,
            Slot::Predictions => &self.predictions_generation,
        }
    }

    /// Start a new request in `slot`, superseding any pending one.
    pub fn begin(&self, slot: Slot) -> Ticket {
        let generation = self.counter(slot).fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { slot, generation }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.counter(ticket.slot).load(Ordering::SeqCst) == ticket.generation
    }

    pub fn current_generation(&self, slot: Slot) -> u64 {
        self.counter(slot).load(Ordering::SeqCst)
    }

    /// Reload the match list for `league`.
    pub async fn on_league_changed(&self, store: &StateStore, league: League) {
        let days = self.lookahead_days;
        let generation = store.dispatch_atomic(|| {
            let ticket = self.begin(Slot::Matches);
            (
                ticket.generation,
                Action::LeagueChanged {
                    league,
                    generation: ticket.generation,
                },
            )
        });
        let ticket = Ticket {
            slot: Slot::Matches,
            generation,
        };

        tracing::info!("Fetching matches for league: {}", league);
        let result = self.backend.fetch_matches(league, days).await;

        // The store checks the generation again when it applies the result.
        if !self.is_current(ticket) {
            tracing::debug!(
                "Discarding stale match list for {} (generation {}, current {})",
                league,
                ticket.generation,
                self.current_generation(Slot::Matches)
            );
            return;
        }

        match result {
            Ok(data) => {
                tracing::info!("Loaded {} matches for {}", data.matches.len(), league);
                store.dispatch(Action::MatchesLoaded {
                    matches: data.matches,
                    days,
                    generation,
                });
            }
            Err(e) => {
                log_transport_error("loading matches", &e);
                store.dispatch(Action::MatchesFailed { generation });
            }
        }
    }

    /// Fetch predictions for `selected`, or flag that nothing is selected.
    pub async fn on_match_selected(&self, store: &StateStore, selected: Option<Match>) {
        let Some(selected) = selected else {
            store.dispatch(Action::SelectionMissing);
            return;
        };

        let context = build_context(&selected);
        let generation = store.dispatch_atomic(|| {
            let ticket = self.begin(Slot::Predictions);
            (
                ticket.generation,
                Action::MatchSelected {
                    selected: selected.clone(),
                    generation: ticket.generation,
                },
            )
        });
        let ticket = Ticket {
            slot: Slot::Predictions,
            generation,
        };

        let result = self
            .backend
            .fetch_prediction(
                &selected.id,
                &selected.home_team,
                &selected.away_team,
                &context,
            )
            .await;

        if !self.is_current(ticket) {
            tracing::debug!(
                "Discarding stale predictions for match {} (generation {})",
                selected.id,
                ticket.generation
            );
            return;
        }

        match result {
            Ok(data) => {
                tracing::info!(
                    "Loaded {} predictions for {} vs {}",
                    data.candidates.len(),
                    selected.home_team,
                    selected.away_team
                );
                store.dispatch(Action::PredictionsLoaded {
                    candidates: data.candidates,
                    generation,
                });
            }
            Err(e) => {
                log_transport_error("generating predictions", &e);
                store.dispatch(Action::PredictionsFailed { generation });
            }
        }
    }
}

fn log_transport_error(during: &str, err: &TransportError) {
    match (err.status(), err.body()) {
        (Some(status), Some(body)) => {
            tracing::error!("Error {}: HTTP {} body={}", during, status, body)
        }
        _ => tracing::error!("Error {}: {}", during, err),
    }
}

/// Prediction context for `m`, filling missing prices with the defaults.
pub fn build_context(m: &Match) -> PredictionContext {
    let home = m.home_odds();
    let away = m.away_odds();

    if home.is_none() || away.is_none() {
        tracing::debug!(
            "Match {} missing odds (home: {:?}, away: {:?}), using defaults",
            m.id,
            home,
            away
        );
    }

    PredictionContext {
        real_match_id: m.id.clone(),
        odds_data: OddsContext {
            home_odds: home.unwrap_or(DEFAULT_HOME_ODDS),
            away_odds: away.unwrap_or(DEFAULT_AWAY_ODDS),
            home_fallback: home.is_none(),
            away_fallback: away.is_none(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{bet, fixture, FakeBackend};
    use crate::error::Notice;
    use std::collections::HashMap;

    fn ids(matches: &[Match]) -> Vec<&str> {
        matches.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_generations_are_per_slot() {
        let c = SelectionFetchCoordinator::new(Arc::new(FakeBackend::new()), 14);
        let a = c.begin(Slot::Matches);
        let p = c.begin(Slot::Predictions);
        assert!(c.is_current(a));
        assert!(c.is_current(p));

        let b = c.begin(Slot::Matches);
        assert!(!c.is_current(a));
        assert!(c.is_current(b));
        assert!(c.is_current(p));
    }

    #[test]
    fn test_context_falls_back_without_odds() {
        let ctx = build_context(&fixture("7", "Lens", "Lille"));
        assert_eq!(ctx.real_match_id, "7");
        assert_eq!(ctx.odds_data.home_odds, 2.0);
        assert_eq!(ctx.odds_data.away_odds, 3.0);
        assert!(ctx.odds_data.home_fallback);
        assert!(ctx.odds_data.away_fallback);
    }

    #[test]
    fn test_context_uses_either_spelling() {
        let mut m = fixture("7", "Lens", "Lille");
        m.odds = Some(HashMap::from([("1".to_string(), 1.65), ("Away".to_string(), 5.2)]));
        let ctx = build_context(&m);
        assert_eq!(ctx.odds_data.home_odds, 1.65);
        assert_eq!(ctx.odds_data.away_odds, 5.2);
        assert!(!ctx.odds_data.home_fallback);

        m.odds = Some(HashMap::from([("Home".to_string(), 1.9), ("2".to_string(), 4.0)]));
        let ctx = build_context(&m);
        assert_eq!(ctx.odds_data.home_odds, 1.9);
        assert_eq!(ctx.odds_data.away_odds, 4.0);
    }

    #[test]
    fn test_context_treats_non_positive_prices_as_missing() {
        let mut m = fixture("7", "Lens", "Lille");
        m.odds = Some(HashMap::from([("Home".to_string(), 0.0), ("Away".to_string(), -1.5)]));
        let ctx = build_context(&m);
        assert_eq!(ctx.odds_data.home_odds, 2.0);
        assert_eq!(ctx.odds_data.away_odds, 3.0);
        assert!(ctx.odds_data.home_fallback);
        assert!(ctx.odds_data.away_fallback);

        // a zero under one spelling does not hide a price under the other
        m.odds = Some(HashMap::from([("Home".to_string(), 0.0), ("1".to_string(), 1.7)]));
        let ctx = build_context(&m);
        assert_eq!(ctx.odds_data.home_odds, 1.7);
        assert!(!ctx.odds_data.home_fallback);
    }

    #[test]
    fn test_completion_after_newer_trigger_is_ignored_by_store() {
        let c = SelectionFetchCoordinator::new(Arc::new(FakeBackend::new()), 14);
        let store = StateStore::new();

        // a result that passed its staleness check just before a newer trigger
        let old = c.begin(Slot::Matches);
        let newer = store.dispatch_atomic(|| {
            let ticket = c.begin(Slot::Matches);
            (
                ticket.generation,
                Action::LeagueChanged {
                    league: League::LaLiga,
                    generation: ticket.generation,
                },
            )
        });
        assert!(newer > old.generation);

        store.dispatch(Action::MatchesLoaded {
            matches: vec![fixture("1", "Arsenal", "Chelsea")],
            days: 14,
            generation: old.generation,
        });

        let state = store.snapshot();
        assert_eq!(state.league, League::LaLiga);
        assert!(state.matches.is_empty());
        assert!(state.matches_status.loading);
    }

    #[tokio::test]
    async fn test_league_change_installs_matches() {
        let backend = Arc::new(
            FakeBackend::new().with_matches(League::PremierLeague, vec![fixture("1", "Arsenal", "Chelsea")]),
        );
        let c = SelectionFetchCoordinator::new(backend.clone(), 14);
        let store = StateStore::new();

        c.on_league_changed(&store, League::PremierLeague).await;

        let state = store.snapshot();
        assert_eq!(ids(&state.matches), vec!["1"]);
        assert!(!state.matches_status.loading);
        assert_eq!(state.matches_status.notice, None);
        assert_eq!(backend.match_requests(), vec![(League::PremierLeague, 14)]);
    }

    #[tokio::test]
    async fn test_empty_league_sets_no_matches_notice() {
        let c = SelectionFetchCoordinator::new(Arc::new(FakeBackend::new()), 7);
        let store = StateStore::new();
        c.on_league_changed(&store, League::Ligue1).await;

        let state = store.snapshot();
        assert!(!state.matches_status.loading);
        assert_eq!(state.matches_status.notice, Some(Notice::NoMatches { days: 7 }));
    }

    #[tokio::test]
    async fn test_transport_failure_sets_generic_notice() {
        let backend = Arc::new(FakeBackend::new().failing_matches(
            League::All,
            TransportError::Status {
                status: 500,
                body: "Traceback ...".to_string(),
            },
        ));
        let c = SelectionFetchCoordinator::new(backend, 14);
        let store = StateStore::new();
        c.on_league_changed(&store, League::All).await;

        let state = store.snapshot();
        assert!(!state.matches_status.loading);
        assert_eq!(state.matches_status.notice, Some(Notice::MatchesUnavailable));
        assert!(state.matches.is_empty());
    }

    #[tokio::test]
    async fn test_superseded_match_list_is_discarded() {
        let backend = Arc::new(
            FakeBackend::new().with_matches(League::LaLiga, vec![fixture("2", "Real Madrid", "Barcelona")]),
        );
        let release_pl = backend.hold_matches(League::PremierLeague);
        let c = Arc::new(SelectionFetchCoordinator::new(backend.clone(), 14));
        let store = Arc::new(StateStore::new());

        let slow = tokio::spawn({
            let c = c.clone();
            let store = store.clone();
            async move { c.on_league_changed(&store, League::PremierLeague).await }
        });
        backend.wait_started().await;

        c.on_league_changed(&store, League::LaLiga).await;
        release_pl
            .send(Ok(vec![fixture("1", "Arsenal", "Chelsea")]))
            .unwrap();
        slow.await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.league, League::LaLiga);
        assert_eq!(ids(&state.matches), vec!["2"]);
        assert!(!state.matches_status.loading);
        assert_eq!(state.generations.matches, 2);
    }

    #[tokio::test]
    async fn test_superseded_failure_is_not_reported() {
        let backend = Arc::new(
            FakeBackend::new().with_matches(League::SerieA, vec![fixture("3", "Inter", "Milan")]),
        );
        let release = backend.hold_matches(League::Bundesliga);
        let c = Arc::new(SelectionFetchCoordinator::new(backend.clone(), 14));
        let store = Arc::new(StateStore::new());

        let slow = tokio::spawn({
            let c = c.clone();
            let store = store.clone();
            async move { c.on_league_changed(&store, League::Bundesliga).await }
        });
        backend.wait_started().await;
        c.on_league_changed(&store, League::SerieA).await;
        release
            .send(Err(TransportError::Timeout(std::time::Duration::from_secs(30))))
            .unwrap();
        slow.await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.matches_status.notice, None);
        assert_eq!(ids(&state.matches), vec!["3"]);
    }

    #[tokio::test]
    async fn test_no_selection_skips_fetch() {
        let backend = Arc::new(FakeBackend::new());
        let c = SelectionFetchCoordinator::new(backend.clone(), 14);
        let store = StateStore::new();

        c.on_match_selected(&store, None).await;

        let state = store.snapshot();
        assert_eq!(state.predictions_status.notice, Some(Notice::NoSelection));
        assert!(!state.predictions_status.loading);
        assert!(backend.prediction_contexts().is_empty());
    }

    #[tokio::test]
    async fn test_match_selection_sends_context_and_installs_candidates() {
        let m = fixture("9", "Lyon", "Nice");
        let backend = Arc::new(
            FakeBackend::new().with_predictions("9", vec![bet("Lyon Win"), bet("Over 2.5 Goals")]),
        );
        let c = SelectionFetchCoordinator::new(backend.clone(), 14);
        let store = StateStore::new();

        c.on_match_selected(&store, Some(m)).await;

        let state = store.snapshot();
        assert!(state.is_selected("9"));
        assert_eq!(state.predictions.len(), 2);
        assert!(!state.predictions_status.loading);

        let sent = backend.prediction_contexts();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].real_match_id, "9");
        assert_eq!(sent[0].odds_data.home_odds, DEFAULT_HOME_ODDS);
    }

    #[tokio::test]
    async fn test_prediction_failure_clears_and_notifies() {
        let backend = Arc::new(
            FakeBackend::new()
                .failing_predictions("9", TransportError::Unreachable("connection refused".into())),
        );
        let c = SelectionFetchCoordinator::new(backend, 14);
        let store = StateStore::new();
        c.on_match_selected(&store, Some(fixture("9", "Lyon", "Nice"))).await;

        let state = store.snapshot();
        assert!(state.predictions.is_empty());
        assert_eq!(
            state.predictions_status.notice,
            Some(Notice::PredictionsUnavailable)
        );
    }

    #[tokio::test]
    async fn test_late_predictions_for_previous_match_are_discarded() {
        let backend = Arc::new(FakeBackend::new().with_predictions("2", vec![bet("Draw")]));
        let release_first = backend.hold_predictions("1");
        let c = Arc::new(SelectionFetchCoordinator::new(backend.clone(), 14));
        let store = Arc::new(StateStore::new());

        let slow = tokio::spawn({
            let c = c.clone();
            let store = store.clone();
            async move {
                c.on_match_selected(&store, Some(fixture("1", "Arsenal", "Chelsea")))
                    .await
            }
        });
        backend.wait_started().await;

        c.on_match_selected(&store, Some(fixture("2", "Everton", "Fulham")))
            .await;
        release_first
            .send(Ok(vec![bet("Arsenal Win"), bet("Chelsea Win")]))
            .unwrap();
        slow.await.unwrap();

        let state = store.snapshot();
        assert!(state.is_selected("2"));
        assert_eq!(state.predictions, vec![bet("Draw")]);
        assert!(!state.predictions_status.loading);
    }
}
