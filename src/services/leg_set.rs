use crate::error::LegSetError;
use crate::models::{Candidate, Leg};

/// Ordered parlay legs, at most one per event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegSet {
    legs: Vec<Leg>,
}

impl LegSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.legs.iter().any(|l| l.event == event)
    }

    /// Append `candidate` unless a leg with the same event is already present.
    /// Returns whether the set changed.
    pub fn add(&mut self, candidate: &Candidate) -> bool {
        if self.contains(&candidate.event) {
            tracing::debug!("Leg '{}' already in parlay, ignoring", candidate.event);
            return false;
        }
        self.legs.push(candidate.clone());
        true
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Leg, LegSetError> {
        if index >= self.legs.len() {
            return Err(LegSetError::OutOfRange {
                index,
                len: self.legs.len(),
            });
        }
        Ok(self.legs.remove(index))
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}
