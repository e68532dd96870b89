//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the vote core (device store, session token,
//! backend vote endpoint) sits behind a trait. This crate provides
//! test-friendly implementations that:
//! - Keep all state in memory
//! - Can be scripted and inspected programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod endpoint;
pub mod ledger;
pub mod session;

pub use endpoint::{NullVoteEndpoint, VoteCall};
pub use ledger::NullLedger;
pub use session::NullSession;
