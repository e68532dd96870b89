//! [`VoteLedger`] over the `votedPosts` record.

use civic_store::{StoreError, VoteLedger, VotedSet, VOTED_POSTS_KEY};
use civic_types::PostId;
use serde_json::{Map, Value};

use crate::FileStore;

fn parse_voted(record: Value) -> Result<VotedSet, StoreError> {
    let Value::Object(entries) = record else {
        return Err(StoreError::Corruption(format!(
            "{VOTED_POSTS_KEY} is not a JSON object"
        )));
    };
    entries
        .into_iter()
        .map(|(id, voted)| match voted {
            Value::Bool(b) => Ok((PostId::from(id), b)),
            other => Err(StoreError::Corruption(format!(
                "{VOTED_POSTS_KEY}[{id}] is {other}, expected a boolean"
            ))),
        })
        .collect()
}

impl VoteLedger for FileStore {
    fn voted_set(&self) -> Result<VotedSet, StoreError> {
        match self.get(VOTED_POSTS_KEY)? {
            Some(record) => parse_voted(record),
            None => Ok(VotedSet::new()),
        }
    }

    fn set_voted(&self, post: &PostId, voted: bool) -> Result<(), StoreError> {
        self.update(|doc| {
            let record = doc
                .entry(VOTED_POSTS_KEY.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            let Value::Object(entries) = record else {
                return Err(StoreError::Corruption(format!(
                    "{VOTED_POSTS_KEY} is not a JSON object"
                )));
            };
            if voted {
                entries.insert(post.to_string(), Value::Bool(true));
            } else {
                entries.remove(post.as_str());
            }
            Ok(())
        })
    }
}
