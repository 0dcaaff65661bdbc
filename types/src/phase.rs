//! The four sequential stages of an election.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow phase, ordered by its numeric discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Phase {
    /// Candidates can be added, updated and deleted.
    RegisterCandidates = 0,
    /// Funders can send value to candidates.
    FoundCandidates = 1,
    /// Ballots can be cast once the vote delay has elapsed.
    Vote = 2,
    /// Terminal: the winner is readable.
    Completed = 3,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::RegisterCandidates,
        Phase::FoundCandidates,
        Phase::Vote,
        Phase::Completed,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// The phase that directly follows this one, if any.
    pub fn next(self) -> Option<Phase> {
        Phase::try_from(self.as_u8() + 1).ok()
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::RegisterCandidates => "register_candidates",
            Phase::FoundCandidates => "found_candidates",
            Phase::Vote => "vote",
            Phase::Completed => "completed",
        }
    }
}

impl TryFrom<u8> for Phase {
    type Error = TypesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Phase::ALL
            .get(value as usize)
            .copied()
            .ok_or(TypesError::UnknownPhase(value))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.as_u8())
    }
}
