//! Vote ledger: which posts this device has voted on.

use std::collections::HashMap;
use std::sync::Arc;

use civic_types::PostId;

use crate::StoreError;

/// Persisted mapping from post id to "this device has voted".
///
/// Only entries with `true` are stored; an absent key means "not voted".
pub type VotedSet = HashMap<PostId, bool>;

/// Local record of the posts the current device has voted on.
///
/// The entry for a post tracks the last vote outcome known locally, not the
/// server's current truth. Writes are per key: setting one post never
/// rewrites or drops the entry of another.
pub trait VoteLedger: Send + Sync {
    /// Read every persisted entry.
    ///
    /// Fails with [`StoreError`] when the backing store is corrupt or
    /// unavailable. Callers treat that as an empty ledger.
    fn voted_set(&self) -> Result<VotedSet, StoreError>;

    /// Record the vote flag for one post and persist it immediately.
    ///
    /// `true` inserts or overwrites the entry, `false` deletes it. Idempotent.
    fn set_voted(&self, post: &PostId, voted: bool) -> Result<(), StoreError>;

    /// Whether the ledger says this device voted on `post`.
    ///
    /// A read failure is logged and answered with `false`.
    fn has_voted(&self, post: &PostId) -> bool {
        match self.voted_set() {
            Ok(set) => set.get(post).copied().unwrap_or(false),
            Err(e) => {
                tracing::warn!(post = %post, error = %e, "vote ledger unreadable, treating as not voted");
                false
            }
        }
    }
}

impl<T: VoteLedger + ?Sized> VoteLedger for Arc<T> {
    fn voted_set(&self) -> Result<VotedSet, StoreError> {
        (**self).voted_set()
    }

    fn set_voted(&self, post: &PostId, voted: bool) -> Result<(), StoreError> {
        (**self).set_voted(post, voted)
    }

    fn has_voted(&self, post: &PostId) -> bool {
        (**self).has_voted(post)
    }
}
