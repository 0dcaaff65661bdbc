//! Voting participation tokens.
//!
//! A participation token is a non-fungible credential minted once per
//! successful vote. Token ids are sequential integers starting at zero.
//! Only the principal holding the minter capability may mint; everyone may
//! read balances and owners.

pub mod error;
pub mod issuer;

pub use error::TokenError;
pub use issuer::{IssuerSnapshot, TokenId, UniquenessTokenIssuer, TOKEN_NAME, TOKEN_SYMBOL};
