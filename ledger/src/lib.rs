//! Authoritative election ledger.
//!
//! Composes the workflow engine, the candidate registry and the participation
//! token issuer into one owned aggregate. Every public operation on
//! [`ElectionLedger`] is role-gated and phase-gated, and either commits all of
//! its effects (plus exactly one [`ElectionEvent`]) or none.
//!
//! Lifecycle: RegisterCandidates → FoundCandidates → Vote → Completed
//!
//! Key principle: one principal = one vote, enforced by the participation
//! token balance (0 ⇒ may vote, ≥1 ⇒ already voted).

pub mod access;
pub mod error;
pub mod event;
pub mod ledger;
pub mod shared;
pub mod snapshot;

pub use access::{AccessTable, Operation, Role};
pub use error::LedgerError;
pub use event::{ElectionEvent, EventBus};
pub use ledger::{ElectionLedger, VotingStatus};
pub use shared::SharedLedger;
pub use snapshot::LedgerSnapshot;

pub use election_registry::{Candidate, CandidateId, CandidateSummaries, PayoutRejected, PayoutSink};
pub use election_token::{TokenId, UniquenessTokenIssuer};
pub use election_workflow::VOTE_DELAY_SECS;
