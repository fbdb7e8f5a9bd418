use tokio::sync::watch;

use crate::error::{LegSetError, Notice};
use crate::models::{Candidate, League, Match, MarketKey, ParlaySummary};
use crate::services::{classify, combine, Classification, LegSet};

/// Progress of one selection slot (match list or prediction list).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotStatus {
    pub loading: bool,
    pub notice: Option<Notice>,
}

impl SlotStatus {
    fn started() -> Self {
        Self {
            loading: true,
            notice: None,
        }
    }

    fn finished(notice: Option<Notice>) -> Self {
        Self {
            loading: false,
            notice,
        }
    }
}

/// Generation of the most recent request issued for each slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Generations {
    pub matches: u64,
    pub predictions: u64,
}

/// Everything a front end needs to render.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    pub league: League,
    pub matches: Vec<Match>,
    pub matches_status: SlotStatus,
    pub selected_match: Option<Match>,
    pub predictions: Vec<Candidate>,
    pub predictions_status: SlotStatus,
    pub expanded_market: Option<MarketKey>,
    pub legs: LegSet,
    pub generations: Generations,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            league: League::All,
            matches: Vec::new(),
            matches_status: SlotStatus::default(),
            selected_match: None,
            predictions: Vec::new(),
            predictions_status: SlotStatus::default(),
            expanded_market: Some(MarketKey::MatchResult),
            legs: LegSet::new(),
            generations: Generations::default(),
        }
    }
}

impl SelectionState {
    /// Market buckets for the current prediction list.
    pub fn markets(&self) -> Classification {
        classify(&self.predictions)
    }

    pub fn parlay(&self, stake: f64) -> ParlaySummary {
        combine(self.legs.legs(), stake)
    }

    pub fn is_selected(&self, match_id: &str) -> bool {
        self.selected_match
            .as_ref()
            .map_or(false, |m| m.id == match_id)
    }

    /// True once a prediction request has finished with nothing to show.
    pub fn has_no_predictions(&self) -> bool {
        self.selected_match.is_some()
            && !self.predictions_status.loading
            && self.predictions_status.notice.is_none()
            && self.predictions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LeagueChanged { league: League, generation: u64 },
    MatchesLoaded { matches: Vec<Match>, days: u32, generation: u64 },
    MatchesFailed { generation: u64 },
    MatchSelected { selected: Match, generation: u64 },
    SelectionMissing,
    PredictionsLoaded { candidates: Vec<Candidate>, generation: u64 },
    PredictionsFailed { generation: u64 },
    ToggleMarket(MarketKey),
    LegAdded(Candidate),
    LegRemoved(usize),
}

/// Pure state transition. Completions carrying a generation older than the
/// slot's current one are ignored.
pub fn reduce(state: &SelectionState, action: Action) -> Result<SelectionState, LegSetError> {
    let mut next = state.clone();

    match action {
        Action::LeagueChanged { league, generation } => {
            next.league = league;
            next.matches.clear();
            next.matches_status = SlotStatus::started();
            next.generations.matches = generation;
        }
        Action::MatchesLoaded { generation, .. } | Action::MatchesFailed { generation }
            if generation != next.generations.matches =>
        {
            tracing::debug!(
                "Ignoring match list from generation {} (current {})",
                generation,
                next.generations.matches
            );
        }
        Action::PredictionsLoaded { generation, .. } | Action::PredictionsFailed { generation }
            if generation != next.generations.predictions =>
        {
            tracing::debug!(
                "Ignoring predictions from generation {} (current {})",
                generation,
                next.generations.predictions
            );
        }
        Action::MatchesLoaded { matches, days, .. } => {
            let notice = matches.is_empty().then_some(Notice::NoMatches { days });
            next.matches = matches;
            next.matches_status = SlotStatus::finished(notice);
        }
        Action::MatchesFailed { .. } => {
            next.matches_status = SlotStatus::finished(Some(Notice::MatchesUnavailable));
        }
        Action::MatchSelected { selected, generation } => {
            next.selected_match = Some(selected);
            next.predictions.clear();
            next.predictions_status = SlotStatus::started();
            next.generations.predictions = generation;
        }
        Action::SelectionMissing => {
            next.predictions_status.notice = Some(Notice::NoSelection);
        }
        Action::PredictionsLoaded { candidates, .. } => {
            next.predictions = candidates;
            next.predictions_status = SlotStatus::finished(None);
        }
        Action::PredictionsFailed { .. } => {
            next.predictions.clear();
            next.predictions_status = SlotStatus::finished(Some(Notice::PredictionsUnavailable));
        }
        Action::ToggleMarket(key) => {
            next.expanded_market = if next.expanded_market == Some(key) {
                None
            } else {
                Some(key)
            };
        }
        Action::LegAdded(candidate) => {
            next.legs.add(&candidate);
        }
        Action::LegRemoved(index) => {
            next.legs.remove_at(index)?;
        }
    }

    Ok(next)
}

/// Observable holder of the current [`SelectionState`].
pub struct StateStore {
    tx: watch::Sender<SelectionState>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SelectionState::default());
        Self { tx }
    }

    pub fn snapshot(&self) -> SelectionState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.tx.subscribe()
    }

    /// Apply `action`; a rejected or no-op action leaves the state untouched
    /// and wakes no subscriber.
    pub fn try_dispatch(&self, action: Action) -> Result<(), LegSetError> {
        let mut outcome = Ok(());
        self.tx.send_if_modified(|state| match reduce(state, action) {
            Ok(next) if next == *state => false,
            Ok(next) => {
                *state = next;
                true
            }
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome
    }

    pub fn dispatch(&self, action: Action) {
        if let Err(e) = self.try_dispatch(action) {
            tracing::warn!("Rejected state transition: {}", e);
        }
    }

    /// Run `start` and apply the action it returns while holding the store's
    /// write lock, so no other transition can land in between.
    pub fn dispatch_atomic<T, F>(&self, start: F) -> T
    where
        T: Default,
        F: FnOnce() -> (T, Action),
    {
        let mut value = T::default();
        self.tx.send_if_modified(|state| {
            let (started, action) = start();
            value = started;
            match reduce(state, action) {
                Ok(next) => {
                    *state = next;
                    true
                }
                Err(e) => {
                    tracing::warn!("Rejected state transition: {}", e);
                    false
                }
            }
        });
        value
    }
}
