use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// HTTP 401: the session token is missing, expired or invalid.
    #[error("session expired or missing, sign in again")]
    Unauthorized,

    /// HTTP 403: authorization or CORS failure.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid response: {0}")]
    Decode(String),

    /// The backend answered but refused the request, with its own message.
    #[error("{0}")]
    Rejected(String),

    #[error("config error: {0}")]
    Config(String),
}
