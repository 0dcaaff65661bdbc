//! Errors raised while parsing or converting fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid principal {0:?}: expected 0x followed by 40 hex digits")]
    InvalidPrincipal(String),

    #[error("unknown phase {0}")]
    UnknownPhase(u8),

    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
}
