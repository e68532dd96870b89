//! [`SessionStore`] over the `authToken` record.

use civic_store::{SessionStore, StoreError, AUTH_TOKEN_KEY};
use serde_json::Value;

use crate::FileStore;

impl SessionStore for FileStore {
    fn token(&self) -> Result<Option<String>, StoreError> {
        match self.get(AUTH_TOKEN_KEY)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(token)) if token.is_empty() => Ok(None),
            Some(Value::String(token)) => Ok(Some(token)),
            Some(other) => Err(StoreError::Corruption(format!(
                "{AUTH_TOKEN_KEY} is {other}, expected a string"
            ))),
        }
    }

    fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.set(AUTH_TOKEN_KEY, Value::String(token.to_string()))
    }

    fn clear_token(&self) -> Result<(), StoreError> {
        self.remove(AUTH_TOKEN_KEY)
    }
}
