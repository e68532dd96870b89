//! Nullable vote endpoint with scripted replies and an optional hold.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use civic_client::{ClientError, VoteEndpoint, VoteReply};
use civic_types::PostId;
use tokio::sync::Semaphore;

/// One recorded call to the endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteCall {
    pub post: PostId,
    pub vote: bool,
    pub token: Option<String>,
}

/// A vote endpoint that answers from a script instead of the network.
///
/// Replies are handed out in order; once the script runs dry every call is
/// accepted without authoritative counts. A gated endpoint holds every call
/// until the test releases a permit, which simulates a slow network.
pub struct NullVoteEndpoint {
    replies: Mutex<VecDeque<Result<VoteReply, ClientError>>>,
    calls: Mutex<Vec<VoteCall>>,
    gate: Option<Arc<Semaphore>>,
    required_token: Option<String>,
}

impl NullVoteEndpoint {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
            required_token: None,
        }
    }

    /// An endpoint that answers with `replies`, in order.
    pub fn with_replies(replies: impl IntoIterator<Item = Result<VoteReply, ClientError>>) -> Self {
        let endpoint = Self::new();
        endpoint.replies.lock().unwrap().extend(replies);
        endpoint
    }

    /// An endpoint whose calls block until a permit is added to the
    /// returned semaphore (`gate.add_permits(1)` releases one call).
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let endpoint = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::new()
        };
        (endpoint, gate)
    }

    /// Answer 401 to any call that does not carry `token`, like the
    /// authenticated toggle endpoint.
    pub fn requiring_token(mut self, token: impl Into<String>) -> Self {
        self.required_token = Some(token.into());
        self
    }

    /// Every call received so far, including ones still held at the gate.
    pub fn calls(&self) -> Vec<VoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for NullVoteEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl VoteEndpoint for NullVoteEndpoint {
    async fn cast_vote(
        &self,
        post: &PostId,
        vote: bool,
        token: Option<&str>,
    ) -> Result<VoteReply, ClientError> {
        self.calls.lock().unwrap().push(VoteCall {
            post: post.clone(),
            vote,
            token: token.map(str::to_string),
        });

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| ClientError::Request(format!("gate closed: {e}")))?
                .forget();
        }

        if let Some(required) = &self.required_token {
            if token != Some(required.as_str()) {
                return Err(ClientError::Unauthorized);
            }
        }

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(VoteReply::accepted()))
    }
}
