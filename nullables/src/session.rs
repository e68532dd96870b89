//! Nullable session: an in-memory auth token.

use std::sync::Mutex;

use civic_store::{SessionStore, StoreError};

pub struct NullSession {
    token: Mutex<Option<String>>,
}

impl NullSession {
    /// A signed-out session.
    pub fn new() -> Self {
        Self {
            token: Mutex::new(None),
        }
    }

    /// A session signed in with `token`.
    pub fn signed_in(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl Default for NullSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for NullSession {
    fn token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.token.lock().unwrap().clone())
    }

    fn set_token(&self, token: &str) -> Result<(), StoreError> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) -> Result<(), StoreError> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}
