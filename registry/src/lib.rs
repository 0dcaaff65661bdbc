//! Candidate registry.
//!
//! Candidates live in an index-addressed roster. Deleting a candidate moves
//! the last candidate into the freed slot, so positions are NOT stable across
//! deletions; every candidate also carries a generated [`CandidateId`] that
//! never changes.
//!
//! The registry also keeps each candidate's accumulated funding and pays it
//! out through a [`PayoutSink`].

pub mod candidate;
pub mod error;
pub mod payout;
pub mod registry;

pub use candidate::{Candidate, CandidateId, CandidateSummaries};
pub use error::RegistryError;
pub use payout::{PayoutRejected, PayoutSink};
pub use registry::{CandidateRegistry, RegistrySnapshot};
