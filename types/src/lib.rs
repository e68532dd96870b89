//! Fundamental types for the civic issue-reporting client.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! post identifiers, reported posts with their category/urgency/location, and the
//! `{votes, user_voted}` pair that the vote protocol moves around.

pub mod error;
pub mod location;
pub mod post;
pub mod vote;

pub use error::TypesError;
pub use location::Location;
pub use post::{Category, Post, PostId, Urgency};
pub use vote::VoteState;
