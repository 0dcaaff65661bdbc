//! Value transfer out of the ledger.

use election_types::{Amount, Principal};
use thiserror::Error;

/// The recipient (or the transport) refused a payout.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("payout rejected: {0}")]
pub struct PayoutRejected(pub String);

/// Moves value from the ledger's custody to a principal.
///
/// A rejected transfer must leave the sink without any effect; the registry
/// restores its own bookkeeping when this returns `Err`.
pub trait PayoutSink {
    fn transfer(&mut self, to: &Principal, amount: Amount) -> Result<(), PayoutRejected>;
}
