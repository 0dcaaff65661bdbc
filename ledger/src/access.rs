//! Role-based authorization.
//!
//! Which role an operation needs is a pure function of the operation
//! ([`Operation::required_role`]); whether a principal holds that role is a
//! lookup in the [`AccessTable`]. Business logic never inspects roles directly.

use election_types::Principal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Drives the workflow, curates the roster and manages roles.
    Admin,
    /// May send funds to candidates.
    Funder,
}

/// Every mutating entry point of the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    AdvancePhase,
    AddCandidate,
    UpdateCandidate,
    DeleteCandidate,
    FundCandidate,
    Withdraw,
    CastVote,
    ManageRoles,
}

impl Operation {
    /// The role a caller must hold, or `None` when the operation is open to everyone.
    pub fn required_role(self) -> Option<Role> {
        match self {
            Self::AdvancePhase
            | Self::AddCandidate
            | Self::UpdateCandidate
            | Self::DeleteCandidate
            | Self::ManageRoles => Some(Role::Admin),
            Self::FundCandidate => Some(Role::Funder),
            Self::Withdraw | Self::CastVote => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::AdvancePhase => "advance_phase",
            Self::AddCandidate => "add_candidate",
            Self::UpdateCandidate => "update_candidate",
            Self::DeleteCandidate => "delete_candidate",
            Self::FundCandidate => "fund_candidate",
            Self::Withdraw => "withdraw",
            Self::CastVote => "cast_vote",
            Self::ManageRoles => "manage_roles",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Role assignments: role → set of principals holding it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTable {
    grants: BTreeMap<Role, BTreeSet<Principal>>,
}

impl AccessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with a single administrator.
    pub fn with_admin(admin: Principal) -> Self {
        let mut table = Self::new();
        table.grant(Role::Admin, admin);
        table
    }

    /// Returns `false` if the principal already held the role.
    pub fn grant(&mut self, role: Role, principal: Principal) -> bool {
        self.grants.entry(role).or_default().insert(principal)
    }

    /// Returns `false` if the principal did not hold the role.
    pub fn revoke(&mut self, role: Role, principal: &Principal) -> bool {
        self.grants
            .get_mut(&role)
            .is_some_and(|holders| holders.remove(principal))
    }

    pub fn has_role(&self, role: Role, principal: &Principal) -> bool {
        self.grants
            .get(&role)
            .is_some_and(|holders| holders.contains(principal))
    }

    pub fn is_admin(&self, principal: &Principal) -> bool {
        self.has_role(Role::Admin, principal)
    }

    pub fn is_funder(&self, principal: &Principal) -> bool {
        self.has_role(Role::Funder, principal)
    }

    /// Allow/deny decision for `principal` performing `operation`.
    pub fn authorize(&self, principal: &Principal, operation: Operation) -> bool {
        match operation.required_role() {
            Some(role) => self.has_role(role, principal),
            None => true,
        }
    }

    pub fn holders(&self, role: Role) -> impl Iterator<Item = &Principal> {
        self.grants.get(&role).into_iter().flatten()
    }
}
