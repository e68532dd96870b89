use civic_store::StoreError;
use thiserror::Error;

/// Why a vote action did not stick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    /// The local ledger could not be read or written. Logged, never shown.
    #[error("vote ledger unavailable: {0}")]
    Storage(#[from] StoreError),

    /// The backend answered 401; the session token has been cleared.
    #[error("sign-in required to vote")]
    AuthRequired,

    /// Network failure, malformed response, or a non-success HTTP status.
    #[error("vote request failed: {0}")]
    Transport(String),

    /// A well-formed reply with `success = false`.
    #[error("vote rejected: {}", .0.as_deref().unwrap_or("no reason given"))]
    ServerRejected(Option<String>),
}

/// A user-facing message for a failed vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub body: String,
    /// Whether the screen should offer to sign in again.
    pub prompt_sign_in: bool,
}

impl VoteError {
    /// What to show the user, if anything.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::Storage(_) => None,
            Self::AuthRequired => Some(Notice {
                title: "Session Expired",
                body: "Please login again to vote.".into(),
                prompt_sign_in: true,
            }),
            Self::Transport(_) => Some(Notice {
                title: "Error",
                body: "Network error. Please try again.".into(),
                prompt_sign_in: false,
            }),
            Self::ServerRejected(reason) => Some(Notice {
                title: "Error",
                body: match reason {
                    Some(reason) => format!("Failed to submit vote: {reason}"),
                    None => "Failed to submit vote. Please try again.".into(),
                },
                prompt_sign_in: false,
            }),
        }
    }
}
