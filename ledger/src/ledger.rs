//! The election ledger: orchestrates workflow, roster, funding and ballots.

use std::collections::HashMap;
use std::sync::Arc;

use crate::access::{AccessTable, Operation, Role};
use crate::error::LedgerError;
use crate::event::{ElectionEvent, EventBus};
use election_registry::{Candidate, CandidateRegistry, CandidateSummaries, PayoutSink, RegistryError};
use election_token::UniquenessTokenIssuer;
use election_types::{Amount, Clock, Phase, Principal, Timestamp};
use election_workflow::WorkflowEngine;
use serde::{Deserialize, Serialize};

/// Whether ballots are admissible right now, and if not, how long until they are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingStatus {
    pub is_open: bool,
    pub seconds_remaining: u64,
}

/// A single election instance.
///
/// The ledger exclusively owns its sub-components; nothing outside reaches
/// them mutably except through the operations below. Each operation validates
/// all of its preconditions before the first mutation, so a returned error
/// always means "nothing happened".
pub struct ElectionLedger {
    /// The ledger's own identity; must hold the issuer's minter capability.
    pub(crate) id: Principal,
    pub(crate) workflow: WorkflowEngine,
    pub(crate) registry: CandidateRegistry,
    pub(crate) issuer: UniquenessTokenIssuer,
    /// voter → index chosen at vote time. Written once per voter.
    pub(crate) voters: HashMap<Principal, usize>,
    pub(crate) access: AccessTable,
    clock: Arc<dyn Clock>,
    bus: EventBus,
    audit: Vec<ElectionEvent>,
}

impl ElectionLedger {
    /// Bind a new election to `issuer`.
    ///
    /// The issuer's minter capability must be granted to `id` (see
    /// [`grant_minter`](Self::grant_minter)) before any ballot can be cast.
    pub fn new(
        id: Principal,
        issuer: UniquenessTokenIssuer,
        access: AccessTable,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::from_parts(
            id,
            WorkflowEngine::new(),
            CandidateRegistry::new(),
            issuer,
            HashMap::new(),
            access,
            clock,
        )
    }

    pub(crate) fn from_parts(
        id: Principal,
        workflow: WorkflowEngine,
        registry: CandidateRegistry,
        issuer: UniquenessTokenIssuer,
        voters: HashMap<Principal, usize>,
        access: AccessTable,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            id,
            workflow,
            registry,
            issuer,
            voters,
            access,
            clock,
            bus: EventBus::new(),
            audit: Vec::new(),
        }
    }

    // ── Plumbing ────────────────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&ElectionEvent) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    /// Every event emitted since this ledger instance was created or loaded.
    pub fn events(&self) -> &[ElectionEvent] {
        &self.audit
    }

    fn emit(&mut self, event: ElectionEvent) {
        self.bus.emit(&event);
        self.audit.push(event);
    }

    fn authorize(&self, caller: &Principal, operation: Operation) -> Result<(), LedgerError> {
        if self.access.authorize(caller, operation) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized {
                principal: caller.to_string(),
                operation,
            })
        }
    }

    fn require_phase(&self, required: Phase) -> Result<(), LedgerError> {
        let current = self.workflow.phase();
        if current == required {
            Ok(())
        } else {
            Err(LedgerError::WrongPhase { required, current })
        }
    }

    fn log_rejection<T>(operation: Operation, caller: &Principal, result: &Result<T, LedgerError>) {
        if let Err(e) = result {
            tracing::debug!(%operation, %caller, error = %e, "operation rejected");
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn id(&self) -> Principal {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.workflow.phase()
    }

    /// When the vote phase began; the epoch until then.
    pub fn vote_opened_at(&self) -> Timestamp {
        self.workflow.vote_opened_at()
    }

    pub fn access(&self) -> &AccessTable {
        &self.access
    }

    pub fn issuer(&self) -> &UniquenessTokenIssuer {
        &self.issuer
    }

    /// Participation tokens held by `principal`.
    pub fn token_balance(&self, principal: &Principal) -> u64 {
        self.issuer.balance_of(principal)
    }

    pub fn candidate_count(&self) -> usize {
        self.registry.len()
    }

    pub fn get_all_candidates(&self) -> CandidateSummaries {
        self.registry.get_all()
    }

    pub fn get_candidate_details(&self, index: usize) -> Result<&Candidate, LedgerError> {
        Ok(self.registry.get_details(index)?)
    }

    // ── Administration ──────────────────────────────────────────────────

    /// Hand the issuer's minter capability to this ledger. `caller` must own the issuer.
    pub fn grant_minter(&mut self, caller: &Principal) -> Result<(), LedgerError> {
        let id = self.id;
        self.issuer.set_minter(caller, id)?;
        Ok(())
    }

    pub fn grant_role(
        &mut self,
        caller: &Principal,
        role: Role,
        principal: Principal,
    ) -> Result<(), LedgerError> {
        self.authorize(caller, Operation::ManageRoles)?;
        if self.access.grant(role, principal) {
            tracing::info!(?role, %principal, "role granted");
            self.emit(ElectionEvent::RoleGranted { role, principal });
        }
        Ok(())
    }

    pub fn revoke_role(
        &mut self,
        caller: &Principal,
        role: Role,
        principal: &Principal,
    ) -> Result<(), LedgerError> {
        self.authorize(caller, Operation::ManageRoles)?;
        if self.access.revoke(role, principal) {
            tracing::info!(?role, %principal, "role revoked");
            self.emit(ElectionEvent::RoleRevoked {
                role,
                principal: *principal,
            });
        }
        Ok(())
    }

    // ── Workflow ────────────────────────────────────────────────────────

    /// Move the election to `requested`, which must be exactly the next phase.
    pub fn advance_phase(&mut self, caller: &Principal, requested: Phase) -> Result<Phase, LedgerError> {
        let result = self.try_advance_phase(caller, requested);
        Self::log_rejection(Operation::AdvancePhase, caller, &result);
        result
    }

    fn try_advance_phase(&mut self, caller: &Principal, requested: Phase) -> Result<Phase, LedgerError> {
        self.authorize(caller, Operation::AdvancePhase)?;
        let now = self.clock.now();
        let phase = self.workflow.advance(requested, now)?;
        tracing::info!(%phase, %now, "phase changed");
        self.emit(ElectionEvent::PhaseChanged { phase });
        Ok(phase)
    }

    // ── Roster ──────────────────────────────────────────────────────────

    /// Register a candidate; returns its index.
    pub fn add_candidate(
        &mut self,
        caller: &Principal,
        name: &str,
        description: &str,
        payout_address: Principal,
    ) -> Result<usize, LedgerError> {
        let result = self.try_add_candidate(caller, name, description, payout_address);
        Self::log_rejection(Operation::AddCandidate, caller, &result);
        result
    }

    fn try_add_candidate(
        &mut self,
        caller: &Principal,
        name: &str,
        description: &str,
        payout_address: Principal,
    ) -> Result<usize, LedgerError> {
        self.authorize(caller, Operation::AddCandidate)?;
        self.require_phase(Phase::RegisterCandidates)?;
        let index = self.registry.add(name, description, payout_address)?;
        tracing::info!(index, name, %payout_address, "candidate added");
        self.emit(ElectionEvent::CandidateAdded {
            name: name.to_string(),
            description: description.to_string(),
            payout_address,
        });
        Ok(index)
    }

    pub fn update_candidate(
        &mut self,
        caller: &Principal,
        index: usize,
        name: &str,
        description: &str,
        payout_address: Principal,
    ) -> Result<(), LedgerError> {
        let result = self.try_update_candidate(caller, index, name, description, payout_address);
        Self::log_rejection(Operation::UpdateCandidate, caller, &result);
        result
    }

    fn try_update_candidate(
        &mut self,
        caller: &Principal,
        index: usize,
        name: &str,
        description: &str,
        payout_address: Principal,
    ) -> Result<(), LedgerError> {
        self.authorize(caller, Operation::UpdateCandidate)?;
        self.require_phase(Phase::RegisterCandidates)?;
        self.registry.update(index, name, description, payout_address)?;
        tracing::info!(index, name, %payout_address, "candidate updated");
        self.emit(ElectionEvent::CandidateUpdated {
            index,
            name: name.to_string(),
            description: description.to_string(),
            payout_address,
        });
        Ok(())
    }

    /// Remove the candidate at `index`. The last candidate takes over its slot.
    pub fn delete_candidate(&mut self, caller: &Principal, index: usize) -> Result<Candidate, LedgerError> {
        let result = self.try_delete_candidate(caller, index);
        Self::log_rejection(Operation::DeleteCandidate, caller, &result);
        result
    }

    fn try_delete_candidate(&mut self, caller: &Principal, index: usize) -> Result<Candidate, LedgerError> {
        self.authorize(caller, Operation::DeleteCandidate)?;
        self.require_phase(Phase::RegisterCandidates)?;
        let removed = self.registry.delete(index)?;
        tracing::info!(index, name = %removed.name, remaining = self.registry.len(), "candidate deleted");
        self.emit(ElectionEvent::CandidateDeleted { index });
        Ok(removed)
    }

    // ── Funding ─────────────────────────────────────────────────────────

    /// Credit `amount` to a candidate; returns the candidate's new balance.
    pub fn fund_candidate(
        &mut self,
        funder: &Principal,
        index: usize,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        let result = self.try_fund_candidate(funder, index, amount);
        Self::log_rejection(Operation::FundCandidate, funder, &result);
        result
    }

    fn try_fund_candidate(
        &mut self,
        funder: &Principal,
        index: usize,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        self.authorize(funder, Operation::FundCandidate)?;
        self.require_phase(Phase::FoundCandidates)?;
        let total = self.registry.fund(index, amount)?;
        tracing::info!(index, %funder, %amount, %total, "candidate funded");
        self.emit(ElectionEvent::CandidateFunded {
            index,
            funder: *funder,
            amount,
        });
        Ok(total)
    }

    /// Pay a candidate's whole balance to its payout address. Allowed in any phase.
    pub fn withdraw(
        &mut self,
        caller: &Principal,
        index: usize,
        sink: &mut dyn PayoutSink,
    ) -> Result<Amount, LedgerError> {
        let result = self.try_withdraw(caller, index, sink);
        Self::log_rejection(Operation::Withdraw, caller, &result);
        result
    }

    fn try_withdraw(
        &mut self,
        caller: &Principal,
        index: usize,
        sink: &mut dyn PayoutSink,
    ) -> Result<Amount, LedgerError> {
        let amount = self
            .registry
            .withdraw(index, caller, sink)
            .map_err(|e| match e {
                RegistryError::NotPayoutAddress { .. } => LedgerError::Unauthorized {
                    principal: caller.to_string(),
                    operation: Operation::Withdraw,
                },
                other => other.into(),
            })?;
        tracing::info!(index, %caller, %amount, "funds withdrawn");
        self.emit(ElectionEvent::FundsWithdrawn { index, amount });
        Ok(amount)
    }

    // ── Ballots ─────────────────────────────────────────────────────────

    /// Cast `voter`'s single ballot for the candidate at `index`.
    ///
    /// On success the candidate gains one vote, the voter receives one
    /// participation token and the choice is recorded.
    pub fn cast_vote(&mut self, voter: &Principal, index: usize) -> Result<(), LedgerError> {
        let result = self.try_cast_vote(voter, index);
        Self::log_rejection(Operation::CastVote, voter, &result);
        result
    }

    fn try_cast_vote(&mut self, voter: &Principal, index: usize) -> Result<(), LedgerError> {
        let current = self.workflow.phase();
        if current != Phase::Vote {
            return Err(LedgerError::VotingNotOpen { current });
        }
        let now = self.clock.now();
        if !self.workflow.voting_open_at(now) {
            return Err(LedgerError::DelayNotElapsed {
                now,
                opens_at: self.can_vote_at(),
            });
        }
        self.registry.get_details(index)?;
        if self.issuer.balance_of(voter) > 0 {
            return Err(LedgerError::AlreadyVoted(voter.to_string()));
        }
        if !self.issuer.is_minter(&self.id) {
            return Err(LedgerError::MinterNotGranted);
        }
        if voter.is_zero() {
            return Err(LedgerError::Token(election_token::TokenError::ZeroRecipient));
        }

        let votes = self.registry.record_vote(index)?;
        let token_id = self.issuer.mint(&self.id, *voter)?;
        self.voters.entry(*voter).or_insert(index);
        tracing::info!(%voter, index, votes, token_id, "vote cast");
        self.emit(ElectionEvent::Voted {
            voter: *voter,
            index,
        });
        Ok(())
    }

    /// The candidate index `principal` voted for.
    pub fn get_user_vote(&self, principal: &Principal) -> Result<usize, LedgerError> {
        if self.issuer.balance_of(principal) == 0 {
            return Err(LedgerError::HasNotVoted(principal.to_string()));
        }
        self.voters
            .get(principal)
            .copied()
            .ok_or_else(|| LedgerError::HasNotVoted(principal.to_string()))
    }

    /// The candidate with the most votes once the election is completed.
    ///
    /// Ties go to the lowest index, so with no votes at all the first
    /// candidate wins. Funding plays no part.
    pub fn get_winner(&self) -> Result<&Candidate, LedgerError> {
        let current = self.workflow.phase();
        if current != Phase::Completed {
            return Err(LedgerError::VotingNotCompleted { current });
        }
        self.registry
            .leader()
            .map(|(_, candidate)| candidate)
            .ok_or(LedgerError::NoCandidates)
    }

    /// Earliest instant a ballot is admissible; the epoch outside the vote phase.
    pub fn can_vote_at(&self) -> Timestamp {
        self.workflow.can_vote_at().unwrap_or(Timestamp::EPOCH)
    }

    pub fn voting_status(&self) -> VotingStatus {
        if self.workflow.phase() != Phase::Vote {
            return VotingStatus {
                is_open: false,
                seconds_remaining: 0,
            };
        }
        let now = self.clock.now();
        let seconds_remaining = self.workflow.seconds_until_open(now);
        VotingStatus {
            is_open: seconds_remaining == 0,
            seconds_remaining,
        }
    }
}
