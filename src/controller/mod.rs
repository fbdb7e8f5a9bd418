use std::sync::Arc;
use tokio::sync::watch;

use crate::api::PredictionBackend;
use crate::config::ClientConfig;
use crate::error::LegSetError;
use crate::models::{Candidate, League, MarketKey, Match, ParlaySummary};
use crate::services::SelectionFetchCoordinator;
use crate::state::{Action, SelectionState, StateStore};

/// Front-end facing entry point: user actions in, [`SelectionState`] out.
pub struct AppController<B: ?Sized> {
    coordinator: SelectionFetchCoordinator<B>,
    store: StateStore,
    unit_stake: f64,
}

impl<B: PredictionBackend + ?Sized> AppController<B> {
    pub fn new(backend: Arc<B>, config: &ClientConfig) -> Self {
        Self {
            coordinator: SelectionFetchCoordinator::new(backend, config.lookahead_days),
            store: StateStore::new(),
            unit_stake: config.unit_stake,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.store.subscribe()
    }

    pub fn unit_stake(&self) -> f64 {
        self.unit_stake
    }

    pub async fn select_league(&self, league: League) {
        self.coordinator.on_league_changed(&self.store, league).await;
    }

    pub async fn select_match(&self, selected: Option<Match>) {
        self.coordinator.on_match_selected(&self.store, selected).await;
    }

    /// Select a match from the loaded list by id. An unknown id counts as no
    /// selection.
    pub async fn select_match_by_id(&self, match_id: &str) {
        let selected = self
            .store
            .snapshot()
            .matches
            .into_iter()
            .find(|m| m.id == match_id);
        if selected.is_none() {
            tracing::warn!("Match {} is not in the current list", match_id);
        }
        self.select_match(selected).await;
    }

    pub fn toggle_market(&self, key: MarketKey) {
        self.store.dispatch(Action::ToggleMarket(key));
    }

    pub fn add_leg(&self, candidate: &Candidate) {
        self.store.dispatch(Action::LegAdded(candidate.clone()));
    }

    pub fn remove_leg(&self, index: usize) -> Result<(), LegSetError> {
        self.store.try_dispatch(Action::LegRemoved(index))
    }

    pub fn parlay(&self) -> ParlaySummary {
        self.store.snapshot().parlay(self.unit_stake)
    }
}
