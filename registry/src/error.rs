//! Registry-specific errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid candidate index {index} (roster has {len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("payout address must not be the null principal")]
    InvalidAddress,

    #[error("funding amount must be non-zero")]
    ZeroAmount,

    #[error("{caller} is not the payout address of candidate {index}")]
    NotPayoutAddress { index: usize, caller: String },

    #[error("candidate {0} has no funds to withdraw")]
    NoFunds(usize),

    #[error("payout to candidate {index} failed: {reason}")]
    TransferFailed { index: usize, reason: String },

    #[error("arithmetic overflow in candidate accounting")]
    Overflow,
}
