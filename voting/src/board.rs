//! The view model shared by every vote-bearing screen.
//!
//! The post list, the my-posts screen and a standalone vote button all hold
//! a [`VoteBoard`]: the displayed `{votes, user_voted}` of their posts plus a
//! per-post phase. A post is `Idle` or `Voting`; a tap only starts a vote
//! action from `Idle`, and the action always ends back in `Idle`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use civic_client::VoteEndpoint;
use civic_store::{SessionStore, VoteLedger};
use civic_types::{Post, PostId, VoteState};

use crate::reconciler::{VoteOutcome, VoteReconciler};

/// Whether a vote action is running for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VotePhase {
    Idle,
    Voting,
}

/// Why a tap did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A vote action for this post has not resolved yet.
    InFlight,
    /// The board does not show this post.
    UnknownPost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapResult {
    Completed(VoteOutcome),
    Ignored(IgnoreReason),
}

impl TapResult {
    pub fn outcome(&self) -> Option<&VoteOutcome> {
        match self {
            Self::Completed(outcome) => Some(outcome),
            Self::Ignored(_) => None,
        }
    }
}

/// Marks a post as `Voting` for as long as it lives.
///
/// Dropping it returns the post to `Idle`, whether the action finished,
/// failed, or its future was dropped half-way.
struct InFlight<'a> {
    voting: &'a Mutex<HashSet<PostId>>,
    post: PostId,
}

impl<'a> InFlight<'a> {
    fn begin(voting: &'a Mutex<HashSet<PostId>>, post: &PostId) -> Option<Self> {
        let inserted = voting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(post.clone());
        inserted.then(|| Self {
            voting,
            post: post.clone(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.voting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.post);
    }
}

/// Displayed vote states for a set of posts, with one action per post at a time.
pub struct VoteBoard<E, L, S> {
    reconciler: Arc<VoteReconciler<E, L, S>>,
    /// Displayed states, in the order the posts were loaded.
    entries: Mutex<Vec<(PostId, VoteState)>>,
    voting: Mutex<HashSet<PostId>>,
}

impl<E, L, S> VoteBoard<E, L, S>
where
    E: VoteEndpoint,
    L: VoteLedger,
    S: SessionStore,
{
    /// An empty board; fill it with [`VoteBoard::load`].
    pub fn new(reconciler: Arc<VoteReconciler<E, L, S>>) -> Self {
        Self {
            reconciler,
            entries: Mutex::new(Vec::new()),
            voting: Mutex::new(HashSet::new()),
        }
    }

    /// A board for a single vote button.
    pub fn single(reconciler: Arc<VoteReconciler<E, L, S>>, post: PostId, state: VoteState) -> Self {
        let board = Self::new(reconciler);
        board.lock_entries().push((post, state));
        board
    }

    pub fn reconciler(&self) -> &Arc<VoteReconciler<E, L, S>> {
        &self.reconciler
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, Vec<(PostId, VoteState)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the board's posts with freshly fetched ones.
    ///
    /// Each post shows the backend's vote count. Its `user_voted` flag is the
    /// backend's when the backend sent one (and the ledger is brought in line),
    /// otherwise the ledger's, otherwise `false`. Posts with a vote action in
    /// flight keep their displayed state.
    pub fn load(&self, posts: &[Post]) {
        let span = civic_utils::spans::refresh_span(posts.len());
        let _enter = span.enter();

        let ledger = self.reconciler.voted_set();
        let voting = self
            .voting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let previous = std::mem::take(&mut *self.lock_entries());

        let mut entries = Vec::with_capacity(posts.len());
        for post in posts {
            if voting.contains(&post.id) {
                if let Some((_, state)) = previous.iter().find(|(id, _)| id == &post.id) {
                    entries.push((post.id.clone(), *state));
                    continue;
                }
            }
            let local = ledger.get(&post.id).copied().unwrap_or(false);
            let user_voted = match post.user_voted {
                Some(server) => {
                    if server != local {
                        self.reconciler.adopt_server_state(&post.id, server);
                    }
                    server
                }
                None => local,
            };
            entries.push((post.id.clone(), VoteState::new(post.votes, user_voted)));
        }
        tracing::debug!(posts = entries.len(), voted = ledger.len(), "vote board loaded");
        *self.lock_entries() = entries;
    }

    pub fn state(&self, post: &PostId) -> Option<VoteState> {
        self.lock_entries()
            .iter()
            .find(|(id, _)| id == post)
            .map(|(_, state)| *state)
    }

    pub fn phase(&self, post: &PostId) -> VotePhase {
        if self
            .voting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(post)
        {
            VotePhase::Voting
        } else {
            VotePhase::Idle
        }
    }

    /// Whether the post's vote control should be disabled.
    pub fn is_voting(&self, post: &PostId) -> bool {
        self.phase(post) == VotePhase::Voting
    }

    /// Sum of displayed votes across the board.
    pub fn total_votes(&self) -> u64 {
        self.lock_entries()
            .iter()
            .map(|(_, state)| u64::from(state.votes))
            .sum()
    }

    /// The `limit` most-voted posts by displayed count, highest first.
    /// Ties keep load order.
    pub fn top(&self, limit: usize) -> Vec<(PostId, VoteState)> {
        let mut ranked = self.snapshot();
        ranked.sort_by(|(_, a), (_, b)| b.votes.cmp(&a.votes));
        ranked.truncate(limit);
        ranked
    }

    /// Displayed states in load order.
    pub fn snapshot(&self) -> Vec<(PostId, VoteState)> {
        self.lock_entries().clone()
    }

    fn show(&self, post: &PostId, state: VoteState) {
        if let Some(entry) = self.lock_entries().iter_mut().find(|(id, _)| id == post) {
            entry.1 = state;
        }
    }

    /// Handle one tap on the vote control of `post`.
    ///
    /// Ignored while a previous action for the same post is unresolved.
    /// Otherwise runs exactly one vote action and returns its outcome.
    pub async fn tap(&self, post: &PostId) -> TapResult {
        let Some(_in_flight) = InFlight::begin(&self.voting, post) else {
            tracing::debug!(post = %post, "tap ignored, vote already in flight");
            return TapResult::Ignored(IgnoreReason::InFlight);
        };
        let Some(current) = self.state(post) else {
            return TapResult::Ignored(IgnoreReason::UnknownPost);
        };

        let outcome = self
            .reconciler
            .vote(post, current, |state| self.show(post, state))
            .await;
        TapResult::Completed(outcome)
    }
}
