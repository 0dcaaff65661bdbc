//! Election workflow: a single monotonic phase pointer.
//!
//! RegisterCandidates → FoundCandidates → Vote → Completed
//!
//! Every transition moves exactly one step forward. Entering `Vote` stamps
//! the opening time, from which the mandatory voting delay is measured.

pub mod engine;
pub mod error;

pub use engine::{WorkflowEngine, WorkflowState, VOTE_DELAY_SECS};
pub use error::WorkflowError;
