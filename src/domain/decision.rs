//! Outcome of a single admission decision.

use std::time::Duration;

/// Decision made for one request of one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// The request consumed one unit of quota and was recorded
    Admitted,
    /// The quota is exhausted; nothing was recorded
    Rejected {
        /// Time until the oldest counted entry leaves the window
        retry_after: Duration,
    },
}

impl AdmissionDecision {
    /// Check if this decision is Admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmissionDecision::Admitted)
    }

    /// Check if this decision is Rejected.
    pub fn is_rejected(&self) -> bool {
        matches!(self, AdmissionDecision::Rejected { .. })
    }

    /// Backoff hint for rejected requests, `None` when admitted.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            AdmissionDecision::Admitted => None,
            AdmissionDecision::Rejected { retry_after } => Some(*retry_after),
        }
    }
}

impl From<AdmissionDecision> for bool {
    fn from(decision: AdmissionDecision) -> Self {
        decision.is_admitted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_predicates() {
        let admitted = AdmissionDecision::Admitted;
        assert!(admitted.is_admitted());
        assert!(!admitted.is_rejected());
        assert_eq!(admitted.retry_after(), None);
        assert!(bool::from(admitted));

        let rejected = AdmissionDecision::Rejected {
            retry_after: Duration::from_secs(3),
        };
        assert!(rejected.is_rejected());
        assert_eq!(rejected.retry_after(), Some(Duration::from_secs(3)));
        assert!(!bool::from(rejected));
    }
}
