//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern. The ledger's external
//! dependencies (clock, value transfer) are abstracted behind traits. This
//! crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod payout;

pub use clock::NullClock;
pub use payout::NullPayout;
