//! Storage ports for the civic client.
//!
//! The device-local key-value store (file-backed on desktop, in-memory in
//! tests) implements these traits. Everything above this crate depends only
//! on the traits, never on a concrete store.

pub mod error;
pub mod ledger;
pub mod session;

pub use error::StoreError;
pub use ledger::{VoteLedger, VotedSet};
pub use session::SessionStore;

/// Key of the vote-ledger record in the device store.
pub const VOTED_POSTS_KEY: &str = "votedPosts";

/// Key of the session-token record in the device store.
pub const AUTH_TOKEN_KEY: &str = "authToken";
