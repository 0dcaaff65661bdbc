//! Sequential participation-token issuer.

use std::collections::HashMap;

use crate::error::TokenError;
use election_types::Principal;
use serde::{Deserialize, Serialize};

/// Display name of the participation token.
pub const TOKEN_NAME: &str = "Voting Participation NFT";

/// Ticker symbol of the participation token.
pub const TOKEN_SYMBOL: &str = "VOTE";

/// Sequential token identifier.
pub type TokenId = u64;

/// Mints participation tokens and answers ownership queries.
///
/// Ownership is recorded per token (`owners[id]`) and aggregated per holder
/// (`balances`). Both views are updated together on every mint.
#[derive(Clone, Debug)]
pub struct UniquenessTokenIssuer {
    /// The deployer; the only principal allowed to reassign the minter.
    owner: Principal,
    /// Principal allowed to call [`mint`](Self::mint). Unset until granted.
    minter: Option<Principal>,
    /// `owners[id]` is the holder of token `id`.
    owners: Vec<Principal>,
    balances: HashMap<Principal, u64>,
}

/// Serializable state of an issuer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssuerSnapshot {
    pub owner: Principal,
    pub minter: Option<Principal>,
    pub owners: Vec<Principal>,
}

impl UniquenessTokenIssuer {
    pub fn new(owner: Principal) -> Self {
        Self {
            owner,
            minter: None,
            owners: Vec::new(),
            balances: HashMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        TOKEN_NAME
    }

    pub fn symbol(&self) -> &'static str {
        TOKEN_SYMBOL
    }

    pub fn owner(&self) -> Principal {
        self.owner
    }

    pub fn minter(&self) -> Option<Principal> {
        self.minter
    }

    /// Whether `principal` currently holds the minter capability.
    pub fn is_minter(&self, principal: &Principal) -> bool {
        self.minter.as_ref() == Some(principal)
    }

    /// Grant the minter capability exclusively to `minter`, revoking any previous holder.
    pub fn set_minter(&mut self, caller: &Principal, minter: Principal) -> Result<(), TokenError> {
        if *caller != self.owner {
            return Err(TokenError::NotOwner(caller.to_string()));
        }
        tracing::info!(%minter, previous = ?self.minter, "minter capability granted");
        self.minter = Some(minter);
        Ok(())
    }

    /// Mint the next sequential token to `to`.
    pub fn mint(&mut self, caller: &Principal, to: Principal) -> Result<TokenId, TokenError> {
        if !self.is_minter(caller) {
            return Err(TokenError::NotMinter(caller.to_string()));
        }
        if to.is_zero() {
            return Err(TokenError::ZeroRecipient);
        }
        let id = TokenId::try_from(self.owners.len()).map_err(|_| TokenError::Overflow)?;
        self.owners.push(to);
        *self.balances.entry(to).or_insert(0) += 1;
        tracing::debug!(token_id = id, %to, "participation token minted");
        Ok(id)
    }

    /// Number of tokens held by `principal`.
    pub fn balance_of(&self, principal: &Principal) -> u64 {
        self.balances.get(principal).copied().unwrap_or(0)
    }

    pub fn owner_of(&self, token_id: TokenId) -> Result<Principal, TokenError> {
        usize::try_from(token_id)
            .ok()
            .and_then(|idx| self.owners.get(idx))
            .copied()
            .ok_or(TokenError::TokenNotFound(token_id))
    }

    /// Total number of tokens ever minted.
    pub fn total_supply(&self) -> u64 {
        self.owners.len() as u64
    }

    pub fn snapshot(&self) -> IssuerSnapshot {
        IssuerSnapshot {
            owner: self.owner,
            minter: self.minter,
            owners: self.owners.clone(),
        }
    }

    /// Rebuild an issuer from a snapshot, recomputing the balance index.
    pub fn from_snapshot(snapshot: IssuerSnapshot) -> Self {
        let mut balances = HashMap::<Principal, u64>::new();
        for holder in &snapshot.owners {
            *balances.entry(*holder).or_default() += 1;
        }
        Self {
            owner: snapshot.owner,
            minter: snapshot.minter,
            owners: snapshot.owners,
            balances,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(byte: u8) -> Principal {
        Principal::repeat_byte(byte)
    }

    fn issuer_with_minter() -> (UniquenessTokenIssuer, Principal) {
        let owner = principal(0xaa);
        let minter = principal(0xbb);
        let mut issuer = UniquenessTokenIssuer::new(owner);
        issuer.set_minter(&owner, minter).unwrap();
        (issuer, minter)
    }

    #[test]
    fn metadata_is_fixed() {
        let issuer = UniquenessTokenIssuer::new(principal(1));
        assert_eq!(issuer.name(), "Voting Participation NFT");
        assert_eq!(issuer.symbol(), "VOTE");
    }

    #[test]
    fn ids_are_sequential_from_zero() {
        let (mut issuer, minter) = issuer_with_minter();
        assert_eq!(issuer.mint(&minter, principal(1)).unwrap(), 0);
        assert_eq!(issuer.mint(&minter, principal(2)).unwrap(), 1);
        assert_eq!(issuer.mint(&minter, principal(1)).unwrap(), 2);
        assert_eq!(issuer.total_supply(), 3);
        assert_eq!(issuer.balance_of(&principal(1)), 2);
        assert_eq!(issuer.balance_of(&principal(2)), 1);
        assert_eq!(issuer.owner_of(1).unwrap(), principal(2));
    }

    #[test]
    fn mint_requires_capability() {
        let (mut issuer, _) = issuer_with_minter();
        let err = issuer.mint(&principal(0xcc), principal(1)).unwrap_err();
        assert!(matches!(err, TokenError::NotMinter(_)));
        assert_eq!(issuer.total_supply(), 0);
    }

    #[test]
    fn no_minter_until_granted() {
        let owner = principal(0xaa);
        let mut issuer = UniquenessTokenIssuer::new(owner);
        assert!(issuer.mint(&owner, principal(1)).is_err());
    }

    #[test]
    fn regranting_revokes_previous_minter() {
        let (mut issuer, old) = issuer_with_minter();
        let owner = issuer.owner();
        issuer.set_minter(&owner, principal(0xdd)).unwrap();
        assert!(!issuer.is_minter(&old));
        assert!(issuer.mint(&old, principal(1)).is_err());
        assert!(issuer.mint(&principal(0xdd), principal(1)).is_ok());
    }

    #[test]
    fn only_owner_sets_minter() {
        let (mut issuer, minter) = issuer_with_minter();
        let err = issuer.set_minter(&minter, minter).unwrap_err();
        assert!(matches!(err, TokenError::NotOwner(_)));
    }

    #[test]
    fn owner_of_unminted_fails() {
        let (issuer, _) = issuer_with_minter();
        assert_eq!(issuer.owner_of(0), Err(TokenError::TokenNotFound(0)));
    }

    #[test]
    fn mint_to_null_principal_rejected() {
        let (mut issuer, minter) = issuer_with_minter();
        assert_eq!(issuer.mint(&minter, Principal::ZERO), Err(TokenError::ZeroRecipient));
    }

    #[test]
    fn snapshot_restores_balances() {
        let (mut issuer, minter) = issuer_with_minter();
        issuer.mint(&minter, principal(1)).unwrap();
        issuer.mint(&minter, principal(2)).unwrap();
        let restored = UniquenessTokenIssuer::from_snapshot(issuer.snapshot());
        assert_eq!(restored.balance_of(&principal(1)), 1);
        assert_eq!(restored.owner_of(1).unwrap(), principal(2));
        assert!(restored.is_minter(&minter));
    }
}
