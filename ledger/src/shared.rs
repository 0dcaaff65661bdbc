//! Serialized access to a ledger shared between threads.
//!
//! Every call takes the single lock for its whole duration, so concurrent
//! callers are linearized and never observe a half-applied operation.

use std::sync::{Arc, Mutex, MutexGuard};

use election_registry::{Candidate, PayoutSink};
use election_types::{Amount, Phase, Principal};

use crate::error::LedgerError;
use crate::ledger::{ElectionLedger, VotingStatus};

#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<ElectionLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: ElectionLedger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Lock the ledger. A panic in another holder does not leave the ledger
    /// half-mutated (operations validate before mutating), so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, ElectionLedger> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` with exclusive access to the ledger.
    pub fn with<R>(&self, f: impl FnOnce(&mut ElectionLedger) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn advance_phase(&self, caller: &Principal, requested: Phase) -> Result<Phase, LedgerError> {
        self.lock().advance_phase(caller, requested)
    }

    pub fn fund_candidate(
        &self,
        funder: &Principal,
        index: usize,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        self.lock().fund_candidate(funder, index, amount)
    }

    pub fn withdraw(
        &self,
        caller: &Principal,
        index: usize,
        sink: &mut dyn PayoutSink,
    ) -> Result<Amount, LedgerError> {
        self.lock().withdraw(caller, index, sink)
    }

    pub fn cast_vote(&self, voter: &Principal, index: usize) -> Result<(), LedgerError> {
        self.lock().cast_vote(voter, index)
    }

    pub fn voting_status(&self) -> VotingStatus {
        self.lock().voting_status()
    }

    pub fn winner(&self) -> Result<Candidate, LedgerError> {
        self.lock().get_winner().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AccessTable, Role};
    use election_nullables::NullClock;
    use election_token::UniquenessTokenIssuer;
    use std::thread;

    #[test]
    fn concurrent_voters_are_linearized() {
        let admin = Principal::repeat_byte(0xad);
        let clock = Arc::new(NullClock::new(10));
        let mut access = AccessTable::with_admin(admin);
        access.grant(Role::Funder, admin);
        let mut ledger =
            ElectionLedger::new(Principal::repeat_byte(0x1e), UniquenessTokenIssuer::new(admin), access, clock.clone());
        ledger.grant_minter(&admin).unwrap();
        ledger.add_candidate(&admin, "Alice", "", Principal::repeat_byte(1)).unwrap();
        ledger.add_candidate(&admin, "Bob", "", Principal::repeat_byte(2)).unwrap();

        let shared = SharedLedger::new(ledger);
        shared.advance_phase(&admin, Phase::FoundCandidates).unwrap();
        shared.advance_phase(&admin, Phase::Vote).unwrap();
        clock.advance(crate::VOTE_DELAY_SECS);

        // 16 distinct voters, each trying to vote twice from two threads.
        let handles: Vec<_> = (0..32u8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let voter = Principal::repeat_byte(0x40 + i / 2);
                    shared.cast_vote(&voter, usize::from(i % 2)).is_ok()
                })
            })
            .collect();
        let accepted = handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .filter(|ok| *ok)
            .count();

        assert_eq!(accepted, 16);
        shared.with(|ledger| {
            let counts = ledger.get_all_candidates().vote_counts;
            assert_eq!(counts.iter().sum::<u64>(), 16);
            assert_eq!(ledger.issuer().total_supply(), 16);
        });

        shared.advance_phase(&admin, Phase::Completed).unwrap();
        assert!(shared.winner().is_ok());
    }
}
