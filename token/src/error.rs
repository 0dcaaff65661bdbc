use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("{0} does not hold the minter capability")]
    NotMinter(String),

    #[error("only the issuer owner can reassign the minter capability, not {0}")]
    NotOwner(String),

    #[error("token {0} has not been minted")]
    TokenNotFound(u64),

    #[error("cannot mint to the null principal")]
    ZeroRecipient,

    #[error("token id space exhausted")]
    Overflow,
}
