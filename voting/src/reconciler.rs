//! One vote action: optimistic update, remote call, reconcile or roll back.

use civic_client::{ClientError, VoteEndpoint};
use civic_store::{SessionStore, VoteLedger, VotedSet};
use civic_types::{PostId, VoteState};
use tracing::Instrument;

use crate::error::{Notice, VoteError};

/// Result of one vote action. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    pub post: PostId,
    /// The state left on screen, and the flag left in the ledger.
    pub state: VoteState,
    /// Whether `state` came from the backend rather than the optimistic guess.
    pub reconciled: bool,
    pub error: Option<VoteError>,
}

impl VoteOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.error.as_ref().and_then(VoteError::notice)
    }
}

/// Runs vote actions against the backend and keeps the vote ledger in step.
///
/// The reconciler is the only writer of the ledger. It does not guard
/// against two actions on the same post; [`crate::VoteBoard`] does that.
pub struct VoteReconciler<E, L, S> {
    endpoint: E,
    ledger: L,
    session: S,
}

impl<E, L, S> VoteReconciler<E, L, S>
where
    E: VoteEndpoint,
    L: VoteLedger,
    S: SessionStore,
{
    pub fn new(endpoint: E, ledger: L, session: S) -> Self {
        Self {
            endpoint,
            ledger,
            session,
        }
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Toggle the vote on `post`, starting from `current`.
    ///
    /// `show` is called with every state the post should display: first the
    /// optimistic guess, then the authoritative or rolled-back state when it
    /// differs. The returned outcome always matches the last state shown.
    /// Never retries.
    pub async fn vote<F>(&self, post: &PostId, current: VoteState, mut show: F) -> VoteOutcome
    where
        F: FnMut(VoteState),
    {
        let optimistic = current.toggled();
        let span = civic_utils::spans::vote_span(post, optimistic.user_voted);
        self.run(post, current, optimistic, &mut show)
            .instrument(span)
            .await
    }

    async fn run<F>(
        &self,
        post: &PostId,
        current: VoteState,
        optimistic: VoteState,
        show: &mut F,
    ) -> VoteOutcome
    where
        F: FnMut(VoteState),
    {
        show(optimistic);
        self.record(post, optimistic.user_voted);

        let token = self.session.token().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "session store unreadable, voting without a token");
            None
        });

        let result = self
            .endpoint
            .cast_vote(post, optimistic.user_voted, token.as_deref())
            .await;

        match result {
            Ok(reply) if reply.success => {
                let state = match reply.server_state {
                    Some(server) => {
                        if server != optimistic {
                            tracing::debug!(
                                optimistic = optimistic.votes,
                                server = server.votes,
                                "server counts replace optimistic state"
                            );
                            show(server);
                        }
                        if server.user_voted != optimistic.user_voted {
                            self.record(post, server.user_voted);
                        }
                        server
                    }
                    None => optimistic,
                };
                tracing::info!(votes = state.votes, voted = state.user_voted, "vote confirmed");
                VoteOutcome {
                    post: post.clone(),
                    state,
                    reconciled: reply.server_state.is_some(),
                    error: None,
                }
            }
            Ok(reply) => {
                self.roll_back(post, current, show, VoteError::ServerRejected(reply.error))
            }
            Err(ClientError::Unauthorized) => {
                if let Err(e) = self.session.clear_token() {
                    tracing::warn!(error = %e, "failed to clear expired session token");
                }
                self.roll_back(post, current, show, VoteError::AuthRequired)
            }
            Err(e) => self.roll_back(post, current, show, VoteError::Transport(e.to_string())),
        }
    }

    fn roll_back<F>(
        &self,
        post: &PostId,
        current: VoteState,
        show: &mut F,
        error: VoteError,
    ) -> VoteOutcome
    where
        F: FnMut(VoteState),
    {
        tracing::warn!(error = %error, "vote failed, restoring previous state");
        show(current);
        self.record(post, current.user_voted);
        VoteOutcome {
            post: post.clone(),
            state: current,
            reconciled: false,
            error: Some(error),
        }
    }

    /// Write the ledger entry for `post`. Failures are logged only.
    fn record(&self, post: &PostId, voted: bool) {
        if let Err(e) = self.ledger.set_voted(post, voted) {
            let err = VoteError::from(e);
            tracing::warn!(post = %post, voted, error = %err, "vote ledger write failed");
        }
    }

    /// Make the ledger agree with a vote flag the backend reported while
    /// fetching posts.
    pub fn adopt_server_state(&self, post: &PostId, user_voted: bool) {
        self.record(post, user_voted);
    }

    /// Every ledger entry; an unreadable ledger reads as empty.
    pub fn voted_set(&self) -> VotedSet {
        self.ledger.voted_set().unwrap_or_else(|e| {
            let err = VoteError::from(e);
            tracing::warn!(error = %err, "vote ledger unreadable, treating as empty");
            VotedSet::new()
        })
    }
}
