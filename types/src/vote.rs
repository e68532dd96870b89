//! The `{votes, user_voted}` pair a vote control displays.

use serde::{Deserialize, Serialize};

/// Displayed vote state of one post.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteState {
    /// Vote count. Unsigned, so `votes >= 0` holds by construction.
    pub votes: u32,
    /// Whether the current user has voted on the post.
    pub user_voted: bool,
}

impl VoteState {
    pub const fn new(votes: u32, user_voted: bool) -> Self {
        Self { votes, user_voted }
    }

    /// The state after the user taps the vote control once.
    ///
    /// Flips `user_voted` and moves `votes` by one in the same direction.
    /// Removing a vote from a count that is already zero stays at zero.
    pub fn toggled(self) -> Self {
        let user_voted = !self.user_voted;
        let votes = if user_voted {
            self.votes.saturating_add(1)
        } else {
            self.votes.saturating_sub(1)
        };
        Self { votes, user_voted }
    }
}
