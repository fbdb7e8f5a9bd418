use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::models::{
    League, MatchesResponse, PredictionContext, PredictionRequest, PredictionResponse,
};

#[cfg(test)]
pub(crate) mod fake;

/// Everything the client needs from the prediction backend.
#[async_trait]
pub trait PredictionBackend: Send + Sync {
    async fn fetch_matches(
        &self,
        league: League,
        days: u32,
    ) -> Result<MatchesResponse, TransportError>;

    async fn fetch_prediction(
        &self,
        match_id: &str,
        home_team: &str,
        away_team: &str,
        context: &PredictionContext,
    ) -> Result<PredictionResponse, TransportError>;
}

/// JSON-over-HTTP backend.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unreachable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::new(&config.api_url, config.timeout)
    }

    fn map_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Unreachable(err.to_string())
        }
    }

    async fn decode<T: DeserializeOwned>(&self, resp: Response) -> Result<T, TransportError> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_error(e))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PredictionBackend for HttpBackend {
    async fn fetch_matches(
        &self,
        league: League,
        days: u32,
    ) -> Result<MatchesResponse, TransportError> {
        tracing::info!("Requesting matches - league: {}, days: {}", league, days);

        let resp = self
            .client
            .get(format!("{}/matches", self.base_url))
            .query(&[("league", league.code().to_string()), ("days", days.to_string())])
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        tracing::debug!("Matches response status: {}", resp.status());
        let data: MatchesResponse = self.decode(resp).await?;
        tracing::debug!("Received {} matches", data.matches.len());
        Ok(data)
    }

    async fn fetch_prediction(
        &self,
        match_id: &str,
        home_team: &str,
        away_team: &str,
        context: &PredictionContext,
    ) -> Result<PredictionResponse, TransportError> {
        tracing::info!("Requesting predictions for {} vs {}", home_team, away_team);

        let request = PredictionRequest {
            match_id,
            home_team,
            away_team,
            context,
        };

        let resp = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let data: PredictionResponse = self.decode(resp).await?;
        tracing::debug!("Received {} candidates for match {}", data.candidates.len(), match_id);
        Ok(data)
    }
}
