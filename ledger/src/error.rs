use crate::access::Operation;
use election_types::{Phase, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{principal} is not authorized to {operation}")]
    Unauthorized {
        principal: String,
        operation: Operation,
    },

    #[error("operation requires phase {required}, current phase is {current}")]
    WrongPhase { required: Phase, current: Phase },

    #[error("voting is not open (current phase is {current})")]
    VotingNotOpen { current: Phase },

    #[error("voting delay has not elapsed: now {now}, ballots accepted from {opens_at}")]
    DelayNotElapsed { now: Timestamp, opens_at: Timestamp },

    #[error("{0} has already voted")]
    AlreadyVoted(String),

    #[error("{0} has not voted")]
    HasNotVoted(String),

    #[error("voting is not completed (current phase is {current})")]
    VotingNotCompleted { current: Phase },

    #[error("no candidates registered")]
    NoCandidates,

    #[error("the ledger does not hold the participation token minter capability")]
    MinterNotGranted,

    #[error(transparent)]
    Workflow(#[from] election_workflow::WorkflowError),

    #[error(transparent)]
    Registry(#[from] election_registry::RegistryError),

    #[error(transparent)]
    Token(#[from] election_token::TokenError),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}
