//! Nullable payout sink: records transfers, optionally refuses recipients.

use election_registry::{PayoutRejected, PayoutSink};
use election_types::{Amount, Principal};
use std::collections::{HashMap, HashSet};

/// An in-memory value transport for testing.
///
/// Every accepted transfer is appended to [`transfers`](Self::transfers) and
/// credited to the recipient's balance. Recipients registered via
/// [`reject`](Self::reject) refuse every payment.
#[derive(Debug, Default)]
pub struct NullPayout {
    transfers: Vec<(Principal, Amount)>,
    balances: HashMap<Principal, Amount>,
    rejecting: HashSet<Principal>,
}

impl NullPayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `recipient` refuse all future payouts.
    pub fn reject(&mut self, recipient: Principal) {
        self.rejecting.insert(recipient);
    }

    /// Let `recipient` accept payouts again.
    pub fn accept(&mut self, recipient: &Principal) {
        self.rejecting.remove(recipient);
    }

    pub fn transfers(&self) -> &[(Principal, Amount)] {
        &self.transfers
    }

    /// Total received by `recipient` so far.
    pub fn balance_of(&self, recipient: &Principal) -> Amount {
        self.balances.get(recipient).copied().unwrap_or(Amount::ZERO)
    }
}

impl PayoutSink for NullPayout {
    fn transfer(&mut self, to: &Principal, amount: Amount) -> Result<(), PayoutRejected> {
        if self.rejecting.contains(to) {
            return Err(PayoutRejected(format!("{to} refuses payments")));
        }
        let balance = self.balances.entry(*to).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| PayoutRejected("recipient balance overflow".into()))?;
        self.transfers.push((*to, amount));
        Ok(())
    }
}
