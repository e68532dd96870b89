//! REST client for the civic issue-reporting backend.
//!
//! Provides what the client core needs from the backend:
//! - Casting votes through one of the two vote contracts ([`VoteMode`])
//! - Sign-in and registration
//! - Listing posts and filing new reports
//!
//! The vote call is also exposed as the [`VoteEndpoint`] port so the vote
//! reconciler can run against a scripted endpoint in tests.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod report;
pub mod wire;

pub use client::BackendClient;
pub use config::{ClientConfig, VoteMode};
pub use endpoint::{VoteEndpoint, VoteReply};
pub use error::ClientError;
pub use report::{ImageAttachment, NewPost, Registration};
