//! Parse errors for the textual forms of the domain types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown urgency: {0}")]
    UnknownUrgency(String),

    #[error("empty post id")]
    EmptyPostId,
}
