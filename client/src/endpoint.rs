//! The vote endpoint port.

use std::future::Future;
use std::sync::Arc;

use civic_types::{PostId, VoteState};

use crate::ClientError;

/// A well-formed answer from a vote endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteReply {
    /// Whether the backend accepted the vote.
    pub success: bool,
    /// Authoritative `{votes, user_voted}` when the backend sent them.
    pub server_state: Option<VoteState>,
    /// The backend's error text on a refused vote.
    pub error: Option<String>,
}

impl VoteReply {
    /// Accepted, without authoritative numbers.
    pub fn accepted() -> Self {
        Self {
            success: true,
            server_state: None,
            error: None,
        }
    }

    /// Accepted, with the backend's counts.
    pub fn authoritative(state: VoteState) -> Self {
        Self {
            success: true,
            server_state: Some(state),
            error: None,
        }
    }

    /// Refused by the backend.
    pub fn rejected(error: Option<String>) -> Self {
        Self {
            success: false,
            server_state: None,
            error,
        }
    }
}

/// Remote vote call.
///
/// Implementations send the intended direction (`vote`) and, when present,
/// the session token. They never retry.
pub trait VoteEndpoint: Send + Sync {
    fn cast_vote(
        &self,
        post: &PostId,
        vote: bool,
        token: Option<&str>,
    ) -> impl Future<Output = Result<VoteReply, ClientError>> + Send;
}

impl<T: VoteEndpoint> VoteEndpoint for Arc<T> {
    fn cast_vote(
        &self,
        post: &PostId,
        vote: bool,
        token: Option<&str>,
    ) -> impl Future<Output = Result<VoteReply, ClientError>> + Send {
        (**self).cast_vote(post, vote, token)
    }
}
