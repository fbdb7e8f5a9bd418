use std::time::Duration;
use thiserror::Error;

/// Failure talking to the prediction backend. The detail here is for logs only;
/// the user sees a [`Notice`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            TransportError::Status { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LegSetError {
    #[error("leg index {index} out of range for {len} legs")]
    OutOfRange { index: usize, len: usize },
}

/// User-visible message attached to a selection slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Notice {
    #[error("Please select a match first")]
    NoSelection,

    #[error("No upcoming matches in the next {days} days")]
    NoMatches { days: u32 },

    #[error("Unable to load matches. Make sure the backend is running.")]
    MatchesUnavailable,

    #[error("Failed to generate predictions. Check backend connection.")]
    PredictionsUnavailable,
}

impl Notice {
    /// Informational notices end loading normally; they are not failures.
    pub fn is_informational(&self) -> bool {
        matches!(self, Notice::NoMatches { .. })
    }
}
