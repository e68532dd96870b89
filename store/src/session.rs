//! Session token storage.

use std::sync::Arc;

use crate::StoreError;

/// Holds the backend auth token of the signed-in user.
pub trait SessionStore: Send + Sync {
    /// The stored token, or `None` when signed out.
    fn token(&self) -> Result<Option<String>, StoreError>;

    fn set_token(&self, token: &str) -> Result<(), StoreError>;

    /// Forget the token. Clearing an absent token is not an error.
    fn clear_token(&self) -> Result<(), StoreError>;

    fn is_signed_in(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn token(&self) -> Result<Option<String>, StoreError> {
        (**self).token()
    }

    fn set_token(&self, token: &str) -> Result<(), StoreError> {
        (**self).set_token(token)
    }

    fn clear_token(&self) -> Result<(), StoreError> {
        (**self).clear_token()
    }
}
