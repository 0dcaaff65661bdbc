use election_types::Phase;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("invalid phase transition: current phase is {current}, requested {requested}")]
    SequenceViolation { current: Phase, requested: Phase },

    #[error("the vote phase cannot open at the epoch")]
    OpenedAtEpoch,
}
