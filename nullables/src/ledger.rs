//! Nullable vote ledger: in-memory, with switchable failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use civic_store::{StoreError, VoteLedger, VotedSet};
use civic_types::PostId;

/// An in-memory vote ledger for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullLedger {
    entries: Mutex<HashMap<PostId, bool>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Start with the given posts marked as voted.
    pub fn with_voted<I, P>(posts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PostId>,
    {
        let ledger = Self::new();
        ledger
            .entries
            .lock()
            .unwrap()
            .extend(posts.into_iter().map(|p| (p.into(), true)));
        ledger
    }

    /// Make every read fail as if the store were corrupt.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write fail as if the store were unavailable.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The stored entry for `post`, bypassing failure injection.
    pub fn entry(&self, post: &PostId) -> Option<bool> {
        self.entries.lock().unwrap().get(post).copied()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl VoteLedger for NullLedger {
    fn voted_set(&self) -> Result<VotedSet, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Corruption("null ledger set to fail reads".into()));
        }
        Ok(self.entries.lock().unwrap().clone())
    }

    fn set_voted(&self, post: &PostId, voted: bool) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null ledger set to fail writes".into()));
        }
        let mut entries = self.entries.lock().unwrap();
        if voted {
            entries.insert(post.clone(), true);
        } else {
            entries.remove(post);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
