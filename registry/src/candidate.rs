//! Candidate records.

use election_types::{Amount, Principal};
use serde::{Deserialize, Serialize};

/// Generated identity of a candidate, stable across deletions of other candidates.
pub type CandidateId = u64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub description: String,
    pub vote_count: u64,
    /// The only principal allowed to withdraw `funds`.
    pub payout_address: Principal,
    /// Accumulated funding in wei, reset to zero by a withdrawal.
    pub funds: Amount,
}

/// Parallel per-candidate columns in current index order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSummaries {
    pub names: Vec<String>,
    pub descriptions: Vec<String>,
    pub vote_counts: Vec<u64>,
}
