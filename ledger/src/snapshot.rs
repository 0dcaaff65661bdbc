//! Ledger snapshots: capture the full election state for persistence.
//!
//! A snapshot holds everything needed to resume an election: the phase and
//! vote opening time, the roster with balances and vote counts, the voter
//! records, the issued participation tokens and the role table. Listeners
//! and the in-memory audit log are not part of it.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use election_registry::{CandidateRegistry, RegistrySnapshot};
use election_token::{IssuerSnapshot, UniquenessTokenIssuer};
use election_types::{Clock, Phase, Principal};
use election_workflow::{WorkflowEngine, WorkflowState};
use serde::{Deserialize, Serialize};

use crate::access::AccessTable;
use crate::error::LedgerError;
use crate::ledger::ElectionLedger;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable election state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Snapshot version for compatibility.
    pub version: u32,
    pub ledger_id: Principal,
    pub workflow: WorkflowState,
    pub registry: RegistrySnapshot,
    pub issuer: IssuerSnapshot,
    /// Voter records sorted by principal so equal states encode identically.
    pub voters: Vec<(Principal, usize)>,
    pub access: AccessTable,
}

impl ElectionLedger {
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut voters: Vec<(Principal, usize)> =
            self.voters.iter().map(|(p, i)| (*p, *i)).collect();
        voters.sort();
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            ledger_id: self.id,
            workflow: self.workflow.state(),
            registry: self.registry.snapshot(),
            issuer: self.issuer.snapshot(),
            voters,
            access: self.access.clone(),
        }
    }

    /// Serialize the election state to bytes.
    pub fn save_state(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(&self.snapshot()).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    /// Restore an election from bytes produced by [`save_state`](Self::save_state).
    pub fn load_state(data: &[u8], clock: Arc<dyn Clock>) -> Result<Self, LedgerError> {
        let snapshot: LedgerSnapshot =
            bincode::deserialize(data).map_err(|e| LedgerError::Snapshot(e.to_string()))?;
        Self::from_snapshot(snapshot, clock)
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot, clock: Arc<dyn Clock>) -> Result<Self, LedgerError> {
        check_consistency(&snapshot).map_err(LedgerError::Snapshot)?;
        let registry = CandidateRegistry::from_snapshot(snapshot.registry);
        let issuer = UniquenessTokenIssuer::from_snapshot(snapshot.issuer);
        let voters: HashMap<Principal, usize> = snapshot.voters.into_iter().collect();
        tracing::info!(
            ledger = %snapshot.ledger_id,
            phase = %snapshot.workflow.phase,
            candidates = registry.len(),
            voters = voters.len(),
            "election state restored"
        );
        Ok(Self::from_parts(
            snapshot.ledger_id,
            WorkflowEngine::from_state(snapshot.workflow),
            registry,
            issuer,
            voters,
            snapshot.access,
            clock,
        ))
    }
}

/// Reject snapshots a running ledger could never have produced.
fn check_consistency(snapshot: &LedgerSnapshot) -> Result<(), String> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(format!(
            "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
            snapshot.version
        ));
    }

    let WorkflowState {
        phase,
        vote_opened_at,
    } = snapshot.workflow;
    let voting_started = phase >= Phase::Vote;
    if voting_started == vote_opened_at.is_epoch() {
        return Err(format!(
            "vote opening time {vote_opened_at} is inconsistent with phase {phase}"
        ));
    }

    let candidates = &snapshot.registry.candidates;
    if let Some(max_id) = candidates.iter().map(|c| c.id).max() {
        if snapshot.registry.next_id <= max_id {
            return Err(format!(
                "next candidate id {} is not above existing id {max_id}",
                snapshot.registry.next_id
            ));
        }
    }

    if !voting_started && !snapshot.voters.is_empty() {
        return Err(format!("voter records present in phase {phase}"));
    }

    let mut tally = vec![0u64; candidates.len()];
    for (voter, index) in &snapshot.voters {
        let slot = tally
            .get_mut(*index)
            .ok_or_else(|| format!("{voter} voted for index {index} outside the roster"))?;
        *slot += 1;
    }

    // Every voter holds exactly one token and every token belongs to a voter.
    let voter_set: BTreeSet<&Principal> = snapshot.voters.iter().map(|(v, _)| v).collect();
    let holder_set: BTreeSet<&Principal> = snapshot.issuer.owners.iter().collect();
    if voter_set.len() != snapshot.voters.len() {
        return Err("duplicate voter record".into());
    }
    if holder_set.len() != snapshot.issuer.owners.len() {
        return Err("principal holds more than one participation token".into());
    }
    if let Some(orphan) = voter_set.difference(&holder_set).next() {
        return Err(format!("voter record for {orphan} without a participation token"));
    }
    if let Some(holder) = holder_set.difference(&voter_set).next() {
        return Err(format!("token holder {holder} has no voter record"));
    }

    for (index, (candidate, votes)) in candidates.iter().zip(&tally).enumerate() {
        if candidate.vote_count != *votes {
            return Err(format!(
                "candidate {index} records {} votes but {votes} voters chose it",
                candidate.vote_count
            ));
        }
    }
    Ok(())
}
