//! Audit events emitted by successful ledger operations.

use crate::access::Role;
use election_types::{Amount, Phase, Principal};
use serde::{Deserialize, Serialize};

/// One event per successful mutating call; failed calls emit nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ElectionEvent {
    PhaseChanged {
        phase: Phase,
    },
    CandidateAdded {
        name: String,
        description: String,
        payout_address: Principal,
    },
    CandidateUpdated {
        index: usize,
        name: String,
        description: String,
        payout_address: Principal,
    },
    CandidateDeleted {
        index: usize,
    },
    CandidateFunded {
        index: usize,
        funder: Principal,
        amount: Amount,
    },
    FundsWithdrawn {
        index: usize,
        amount: Amount,
    },
    Voted {
        voter: Principal,
        index: usize,
    },
    RoleGranted {
        role: Role,
        principal: Principal,
    },
    RoleRevoked {
        role: Role,
        principal: Principal,
    },
}

/// Synchronous fan-out event bus for election events.
///
/// Listeners are invoked inline on the emitting thread, while the ledger is
/// mid-operation; keep handlers fast and never call back into the ledger.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&ElectionEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&ElectionEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &ElectionEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
