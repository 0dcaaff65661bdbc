//! Fundamental types for the election ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! principals, amounts, timestamps and the workflow phase enum.

pub mod address;
pub mod amount;
pub mod error;
pub mod phase;
pub mod time;

pub use address::Principal;
pub use amount::Amount;
pub use error::TypesError;
pub use phase::Phase;
pub use time::{Clock, SystemClock, Timestamp};
