//! In-memory backend for tests. Responses can be held open so a test decides
//! when (and in which order) requests complete.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::{oneshot, Notify};

use super::PredictionBackend;
use crate::error::TransportError;
use crate::models::{
    Candidate, League, Match, MatchesResponse, PredictionContext, PredictionResponse,
};

type MatchesReply = Result<Vec<Match>, TransportError>;
type PredictionsReply = Result<Vec<Candidate>, TransportError>;

pub fn fixture(id: &str, home: &str, away: &str) -> Match {
    Match {
        id: id.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        date: Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap(),
        competition: "Test League".to_string(),
        odds: None,
    }
}

pub fn bet(event: &str) -> Candidate {
    Candidate {
        event: event.to_string(),
        prob: 0.5,
        odds: 2.0,
        ev: Some(0.02),
        reasoning: None,
    }
}

#[derive(Default)]
pub struct FakeBackend {
    matches: Mutex<HashMap<League, MatchesReply>>,
    predictions: Mutex<HashMap<String, PredictionsReply>>,
    held_matches: Mutex<HashMap<League, oneshot::Receiver<MatchesReply>>>,
    held_predictions: Mutex<HashMap<String, oneshot::Receiver<PredictionsReply>>>,
    match_requests: Mutex<Vec<(League, u32)>>,
    contexts: Mutex<Vec<PredictionContext>>,
    started: Notify,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matches(self, league: League, matches: Vec<Match>) -> Self {
        self.matches.lock().unwrap().insert(league, Ok(matches));
        self
    }

    pub fn failing_matches(self, league: League, err: TransportError) -> Self {
        self.matches.lock().unwrap().insert(league, Err(err));
        self
    }

    pub fn with_predictions(self, match_id: &str, candidates: Vec<Candidate>) -> Self {
        self.predictions
            .lock()
            .unwrap()
            .insert(match_id.to_string(), Ok(candidates));
        self
    }

    pub fn failing_predictions(self, match_id: &str, err: TransportError) -> Self {
        self.predictions
            .lock()
            .unwrap()
            .insert(match_id.to_string(), Err(err));
        self
    }

    /// The next match request for `league` blocks until the sender fires.
    pub fn hold_matches(&self, league: League) -> oneshot::Sender<MatchesReply> {
        let (tx, rx) = oneshot::channel();
        self.held_matches.lock().unwrap().insert(league, rx);
        tx
    }

    pub fn hold_predictions(&self, match_id: &str) -> oneshot::Sender<PredictionsReply> {
        let (tx, rx) = oneshot::channel();
        self.held_predictions
            .lock()
            .unwrap()
            .insert(match_id.to_string(), rx);
        tx
    }

    /// Resolves once a request has reached the backend.
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn match_requests(&self) -> Vec<(League, u32)> {
        self.match_requests.lock().unwrap().clone()
    }

    pub fn prediction_contexts(&self) -> Vec<PredictionContext> {
        self.contexts.lock().unwrap().clone()
    }
}

fn dropped() -> TransportError {
    TransportError::Unreachable("held response dropped".to_string())
}

#[async_trait]
impl PredictionBackend for FakeBackend {
    async fn fetch_matches(
        &self,
        league: League,
        days: u32,
    ) -> Result<MatchesResponse, TransportError> {
        self.match_requests.lock().unwrap().push((league, days));
        let held = self.held_matches.lock().unwrap().remove(&league);
        self.started.notify_one();

        let reply = match held {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(dropped())),
            None => {
                let stored = self.matches.lock().unwrap().get(&league).cloned();
                stored.unwrap_or_else(|| Ok(Vec::new()))
            }
        };

        reply.map(|matches| MatchesResponse { matches })
    }

    async fn fetch_prediction(
        &self,
        match_id: &str,
        _home_team: &str,
        _away_team: &str,
        context: &PredictionContext,
    ) -> Result<PredictionResponse, TransportError> {
        self.contexts.lock().unwrap().push(context.clone());
        let held = self.held_predictions.lock().unwrap().remove(match_id);
        self.started.notify_one();

        let reply = match held {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(dropped())),
            None => {
                let stored = self.predictions.lock().unwrap().get(match_id).cloned();
                stored.unwrap_or_else(|| Ok(Vec::new()))
            }
        };

        reply.map(|candidates| PredictionResponse { candidates })
    }
}
