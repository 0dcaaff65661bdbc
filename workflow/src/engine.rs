//! Core workflow engine: owns the phase pointer and the vote opening time.

use crate::error::WorkflowError;
use election_types::{Phase, Timestamp};
use serde::{Deserialize, Serialize};

/// Delay between the opening of the vote phase and the first admissible ballot.
pub const VOTE_DELAY_SECS: u64 = 60 * 60;

/// Serializable workflow state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub phase: Phase,
    /// `EPOCH` until the vote phase begins; never changes afterwards.
    pub vote_opened_at: Timestamp,
}

#[derive(Clone, Debug)]
pub struct WorkflowEngine {
    state: WorkflowState,
}

impl WorkflowEngine {
    pub fn new() -> Self {
        Self {
            state: WorkflowState {
                phase: Phase::RegisterCandidates,
                vote_opened_at: Timestamp::EPOCH,
            },
        }
    }

    pub fn from_state(state: WorkflowState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn vote_opened_at(&self) -> Timestamp {
        self.state.vote_opened_at
    }

    /// Move to `requested`, which must be exactly one step after the current phase.
    ///
    /// Re-requesting the current phase, going backwards and skipping ahead are
    /// all sequence violations. `Completed` has no successor, so every call
    /// made once it is reached fails. Entering `Vote` requires `now` to be
    /// after the epoch.
    pub fn advance(&mut self, requested: Phase, now: Timestamp) -> Result<Phase, WorkflowError> {
        let current = self.state.phase;
        if current.next() != Some(requested) {
            return Err(WorkflowError::SequenceViolation { current, requested });
        }
        if requested == Phase::Vote {
            // The epoch marks "not opened yet", so it cannot be an opening time.
            if now.is_epoch() {
                return Err(WorkflowError::OpenedAtEpoch);
            }
            self.state.vote_opened_at = now;
        }
        self.state.phase = requested;
        tracing::debug!(from = %current, to = %requested, "workflow advanced");
        Ok(requested)
    }

    /// Earliest instant a ballot is admissible, or `None` outside the vote phase.
    pub fn can_vote_at(&self) -> Option<Timestamp> {
        (self.state.phase == Phase::Vote)
            .then(|| self.state.vote_opened_at.plus_secs(VOTE_DELAY_SECS))
    }

    /// Whether ballots are admissible at `now`.
    pub fn voting_open_at(&self, now: Timestamp) -> bool {
        self.state.phase == Phase::Vote
            && self.state.vote_opened_at.has_expired(VOTE_DELAY_SECS, now)
    }

    /// Seconds until ballots become admissible; zero outside the vote phase
    /// or once the delay has elapsed.
    pub fn seconds_until_open(&self, now: Timestamp) -> u64 {
        self.can_vote_at()
            .map(|at| at.as_secs().saturating_sub(now.as_secs()))
            .unwrap_or(0)
    }
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self::new()
    }
}
