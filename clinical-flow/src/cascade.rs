//! The backend cascade as an explicit state machine.
//!
//! `CascadeState::on` is a pure transition function. The orchestrator drives
//! it by performing the side effect a state asks for and feeding back the
//! resulting event, so the ordering rules can be tested without any backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_BACKEND_CONFIDENCE: u8 = 85;
pub const DEFAULT_RESCUE_CONFIDENCE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeConfig {
    /// Ceiling for a single backend attempt.
    pub attempt_timeout: Duration,
    /// Reported when a backend succeeds without stating its own confidence.
    pub backend_confidence: u8,
    /// Forced confidence of a deterministic report produced after an error.
    pub rescue_confidence: u8,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            backend_confidence: DEFAULT_BACKEND_CONFIDENCE,
            rescue_confidence: DEFAULT_RESCUE_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Timeout,
    Quota,
    Overloaded,
    NotFound,
    Malformed,
    OtherError,
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success)
    }
}

/// One recorded backend attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAttempt {
    pub provider_id: String,
    pub model_candidate: String,
    pub outcome: AttemptOutcome,
    pub latency_ms: u64,
}

impl ProviderAttempt {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeState {
    NotStarted,
    TryingPrimaryBackend,
    TryingSecondaryBackend,
    /// `index` into the secondary backend's `total` model candidates.
    TryingModelCandidate { index: usize, total: usize },
    DeterministicFallback,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeEvent {
    Begin,
    /// The backend or candidate for the current state is not configured.
    Skipped,
    Attempted(AttemptOutcome),
    SecondaryReady { candidates: usize },
    FallbackComplete,
}

impl CascadeState {
    /// Next state for `event`. Events that do not apply to the current state
    /// leave it unchanged.
    pub fn on(self, event: CascadeEvent) -> CascadeState {
        use CascadeEvent as E;
        use CascadeState as S;

        match (self, event) {
            (S::NotStarted, E::Begin) => S::TryingPrimaryBackend,

            (S::TryingPrimaryBackend, E::Attempted(outcome)) if outcome.is_success() => S::Done,
            (S::TryingPrimaryBackend, E::Attempted(_) | E::Skipped) => S::TryingSecondaryBackend,

            (S::TryingSecondaryBackend, E::SecondaryReady { candidates: 0 } | E::Skipped) => {
                S::DeterministicFallback
            }
            (S::TryingSecondaryBackend, E::SecondaryReady { candidates }) => {
                S::TryingModelCandidate {
                    index: 0,
                    total: candidates,
                }
            }

            (S::TryingModelCandidate { .. }, E::Attempted(outcome)) if outcome.is_success() => {
                S::Done
            }
            (S::TryingModelCandidate { index, total }, E::Attempted(_)) if index + 1 < total => {
                S::TryingModelCandidate {
                    index: index + 1,
                    total,
                }
            }
            (S::TryingModelCandidate { .. }, E::Attempted(_) | E::Skipped) => {
                S::DeterministicFallback
            }

            (S::DeterministicFallback, E::FallbackComplete) => S::Done,

            (state, _) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CascadeState::Done)
    }
}
