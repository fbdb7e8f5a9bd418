//! Client-side prediction and parlay layer for the OddsForge match predictor.
//!
//! Loads upcoming matches and model predictions from the backend, groups
//! predictions into betting markets, and keeps the user's accumulator legs.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use api::{HttpBackend, PredictionBackend};
pub use config::ClientConfig;
pub use controller::AppController;
pub use error::{LegSetError, Notice, TransportError};
pub use state::{SelectionState, StateStore};
