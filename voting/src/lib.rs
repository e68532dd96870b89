//! Optimistic vote protocol for the civic client.
//!
//! A tap on a vote control flips the displayed state at once, records the
//! new flag in the local vote ledger, and calls the backend. The backend's
//! answer either confirms the guess, replaces it with authoritative counts,
//! or rolls both the display and the ledger back.
//!
//! - [`VoteReconciler`] runs one vote action against injected ports.
//! - [`VoteBoard`] is the view model every vote-bearing screen shares: it
//!   holds displayed states and lets one action per post run at a time.

pub mod board;
pub mod error;
pub mod reconciler;

pub use board::{IgnoreReason, TapResult, VoteBoard, VotePhase};
pub use error::{Notice, VoteError};
pub use reconciler::{VoteOutcome, VoteReconciler};
