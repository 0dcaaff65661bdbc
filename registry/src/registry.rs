//! The candidate roster and its accounting.

use crate::candidate::{Candidate, CandidateId, CandidateSummaries};
use crate::error::RegistryError;
use crate::payout::PayoutSink;
use election_types::{Amount, Principal};
use serde::{Deserialize, Serialize};

/// Ordered, index-addressed candidate roster.
///
/// Indices follow swap-and-pop semantics: [`delete`](Self::delete) overwrites
/// the removed slot with the last candidate and truncates. Callers that need
/// a durable handle should hold the [`CandidateId`] instead.
#[derive(Clone, Debug, Default)]
pub struct CandidateRegistry {
    candidates: Vec<Candidate>,
    next_id: CandidateId,
}

/// Serializable state of a registry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub candidates: Vec<Candidate>,
    pub next_id: CandidateId,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    fn check_index(&self, index: usize) -> Result<(), RegistryError> {
        if index < self.candidates.len() {
            Ok(())
        } else {
            Err(RegistryError::InvalidIndex {
                index,
                len: self.candidates.len(),
            })
        }
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut Candidate, RegistryError> {
        let len = self.candidates.len();
        self.candidates
            .get_mut(index)
            .ok_or(RegistryError::InvalidIndex { index, len })
    }

    /// Append a candidate with zero votes and zero funds; returns its index.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        payout_address: Principal,
    ) -> Result<usize, RegistryError> {
        if payout_address.is_zero() {
            return Err(RegistryError::InvalidAddress);
        }
        let id = self.next_id;
        self.next_id = self.next_id.checked_add(1).ok_or(RegistryError::Overflow)?;
        self.candidates.push(Candidate {
            id,
            name: name.into(),
            description: description.into(),
            vote_count: 0,
            payout_address,
            funds: Amount::ZERO,
        });
        Ok(self.candidates.len() - 1)
    }

    /// Overwrite the descriptive fields of a candidate; votes and funds are kept.
    pub fn update(
        &mut self,
        index: usize,
        name: impl Into<String>,
        description: impl Into<String>,
        payout_address: Principal,
    ) -> Result<(), RegistryError> {
        self.check_index(index)?;
        if payout_address.is_zero() {
            return Err(RegistryError::InvalidAddress);
        }
        let candidate = self.slot_mut(index)?;
        candidate.name = name.into();
        candidate.description = description.into();
        candidate.payout_address = payout_address;
        Ok(())
    }

    /// Remove the candidate at `index` by moving the last candidate into its slot.
    ///
    /// Returns the removed candidate.
    pub fn delete(&mut self, index: usize) -> Result<Candidate, RegistryError> {
        self.check_index(index)?;
        Ok(self.candidates.swap_remove(index))
    }

    /// Add `amount` to the candidate's accumulated funds; returns the new total.
    pub fn fund(&mut self, index: usize, amount: Amount) -> Result<Amount, RegistryError> {
        self.check_index(index)?;
        if amount.is_zero() {
            return Err(RegistryError::ZeroAmount);
        }
        let candidate = self.slot_mut(index)?;
        candidate.funds = candidate
            .funds
            .checked_add(amount)
            .ok_or(RegistryError::Overflow)?;
        Ok(candidate.funds)
    }

    /// Pay the candidate's whole balance out to its payout address.
    ///
    /// The balance is zeroed before the transfer is attempted and restored if
    /// the sink rejects it, so a failed withdrawal leaves no trace.
    pub fn withdraw(
        &mut self,
        index: usize,
        caller: &Principal,
        sink: &mut dyn PayoutSink,
    ) -> Result<Amount, RegistryError> {
        let candidate = self.slot_mut(index)?;
        if candidate.payout_address != *caller {
            return Err(RegistryError::NotPayoutAddress {
                index,
                caller: caller.to_string(),
            });
        }
        if candidate.funds.is_zero() {
            return Err(RegistryError::NoFunds(index));
        }

        let amount = std::mem::replace(&mut candidate.funds, Amount::ZERO);
        if let Err(rejected) = sink.transfer(caller, amount) {
            candidate.funds = amount;
            tracing::warn!(index, %caller, %amount, "payout rejected, balance restored");
            return Err(RegistryError::TransferFailed {
                index,
                reason: rejected.0,
            });
        }
        Ok(amount)
    }

    /// Increment the candidate's vote count; returns the new count.
    pub fn record_vote(&mut self, index: usize) -> Result<u64, RegistryError> {
        let candidate = self.slot_mut(index)?;
        candidate.vote_count = candidate
            .vote_count
            .checked_add(1)
            .ok_or(RegistryError::Overflow)?;
        Ok(candidate.vote_count)
    }

    pub fn get_details(&self, index: usize) -> Result<&Candidate, RegistryError> {
        self.candidates.get(index).ok_or(RegistryError::InvalidIndex {
            index,
            len: self.candidates.len(),
        })
    }

    pub fn get_all(&self) -> CandidateSummaries {
        let mut summaries = CandidateSummaries::default();
        for c in &self.candidates {
            summaries.names.push(c.name.clone());
            summaries.descriptions.push(c.description.clone());
            summaries.vote_counts.push(c.vote_count);
        }
        summaries
    }

    /// Current position of the candidate with the given id.
    pub fn position_of(&self, id: CandidateId) -> Option<usize> {
        self.candidates.iter().position(|c| c.id == id)
    }

    /// The candidate with the most votes; on ties the lowest index wins.
    pub fn leader(&self) -> Option<(usize, &Candidate)> {
        let mut best: Option<(usize, &Candidate)> = None;
        for (i, c) in self.candidates.iter().enumerate() {
            match best {
                Some((_, leader)) if c.vote_count <= leader.vote_count => {}
                _ => best = Some((i, c)),
            }
        }
        best
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            candidates: self.candidates.clone(),
            next_id: self.next_id,
        }
    }

    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            candidates: snapshot.candidates,
            next_id: snapshot.next_id,
        }
    }
}
