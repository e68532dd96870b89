//! Pre-built [`tracing::Span`] constructors for client operations.
//!
//! Consistent span names and fields make one vote action easy to follow
//! from tap to reconciliation in the logs.

use civic_types::PostId;
use tracing::{info_span, Span};

/// Span covering one vote action, from optimistic update to final state.
pub fn vote_span(post: &PostId, direction: bool) -> Span {
    info_span!("vote", post = %post, up = direction)
}

/// Span covering a board refresh (fetch and hydrate).
pub fn refresh_span(post_count: usize) -> Span {
    info_span!("refresh", posts = post_count)
}
