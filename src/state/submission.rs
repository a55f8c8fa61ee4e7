use std::time::{Duration, Instant};

use thiserror::Error;
use uuid::Uuid;

/// Label shown on the submit control while idle.
pub const IDLE_LABEL: &str = "Send";
/// Label shown on the submit control while a settlement is in flight.
pub const BUSY_LABEL: &str = "Sending...";

/// Unique identifier for one submission attempt.
pub type SubmissionId = Uuid;

/// Phases of the settlement submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionPhase {
    /// Nothing in flight; the submit control is enabled.
    Idle,
    /// A settlement workflow is running.
    Submitting {
        /// Identifier of the running attempt.
        id: SubmissionId,
        /// When the attempt started.
        since: Instant,
    },
}

/// Error returned when a submission cannot start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("a settlement is already in flight")]
pub struct AlreadyInFlight {
    /// Attempt currently holding the submitter.
    pub running: SubmissionId,
}

/// Errors that can occur when finishing a submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinishError {
    /// No submission is running.
    #[error("no submission is in flight")]
    NotSubmitting,
    /// The identifier does not match the running attempt.
    #[error("submission {got} does not match running submission {expected}")]
    IdMismatch {
        /// Running attempt.
        expected: SubmissionId,
        /// Provided attempt.
        got: SubmissionId,
    },
}

/// Enabled state and label of the submit control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    /// Set while an attempt is in flight.
    pub disabled: bool,
    /// Text on the control.
    pub label: &'static str,
}

/// Single-flight guard over the settlement workflow.
#[derive(Debug, Clone)]
pub struct SubmissionMachine {
    phase: SubmissionPhase,
}

impl Default for SubmissionMachine {
    fn default() -> Self {
        Self {
            phase: SubmissionPhase::Idle,
        }
    }
}

impl SubmissionMachine {
    /// Create a machine in the idle phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an attempt holds the submitter.
    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, SubmissionPhase::Submitting { .. })
    }

    /// State of the submit control for the current phase.
    pub fn control(&self) -> SubmitControl {
        if self.is_in_flight() {
            SubmitControl {
                disabled: true,
                label: BUSY_LABEL,
            }
        } else {
            SubmitControl {
                disabled: false,
                label: IDLE_LABEL,
            }
        }
    }

    /// Move to [`SubmissionPhase::Submitting`], rejecting the request while another attempt runs.
    pub fn begin(&mut self) -> Result<SubmissionId, AlreadyInFlight> {
        if let SubmissionPhase::Submitting { id, .. } = self.phase {
            return Err(AlreadyInFlight { running: id });
        }

        let id = Uuid::new_v4();
        self.phase = SubmissionPhase::Submitting {
            id,
            since: Instant::now(),
        };
        Ok(id)
    }

    /// Return to [`SubmissionPhase::Idle`] once the attempt `id` is over,
    /// yielding how long it held the submitter.
    pub fn finish(&mut self, id: SubmissionId) -> Result<Duration, FinishError> {
        match self.phase {
            SubmissionPhase::Idle => Err(FinishError::NotSubmitting),
            SubmissionPhase::Submitting { id: running, .. } if running != id => {
                Err(FinishError::IdMismatch {
                    expected: running,
                    got: id,
                })
            }
            SubmissionPhase::Submitting { since, .. } => {
                self.phase = SubmissionPhase::Idle;
                Ok(since.elapsed())
            }
        }
    }
}
