//! Shared utilities for the election ledger binaries.

pub mod logging;

pub use logging::{init_logging, LogFormat, UnknownLogFormat};
