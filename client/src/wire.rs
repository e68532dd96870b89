//! Backend payloads and how their HTTP responses are interpreted.
//!
//! Everything here is pure: it takes a status code and a body and decides
//! what the response means, so it can be tested without a server.

use serde::Deserialize;
use serde_json::Value;

use civic_types::{Category, Location, Post, PostId, Urgency, VoteState};

use crate::{ClientError, VoteMode, VoteReply};

/// Longest slice of an error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

fn truncate(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// First message of a DRF-style error field: a string, or a list of strings.
fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_message),
        _ => None,
    }
}

// ── Votes ──────────────────────────────────────────────────────────────

/// Body of `POST /api/posts/{id}/vote/`.
#[derive(Debug, Deserialize)]
struct ToggleVoteBody {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    vote_count: Option<u32>,
    #[serde(default)]
    user_has_voted: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Body of `POST /api/posts/{id}/public_vote/`.
#[derive(Debug, Deserialize)]
struct PublicVoteBody {
    success: bool,
    #[serde(default)]
    post: Option<PublicVotePost>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PublicVotePost {
    votes: u32,
    #[serde(default)]
    user_has_voted: Option<bool>,
}

/// Interpret a vote response.
///
/// `intent` is the direction that was sent; it stands in for the server's
/// flag when the server reports a count without one.
pub fn interpret_vote_response(
    mode: VoteMode,
    intent: bool,
    status: u16,
    body: &str,
) -> Result<VoteReply, ClientError> {
    match status {
        401 => return Err(ClientError::Unauthorized),
        403 => return Err(ClientError::Forbidden(truncate(body))),
        s if !is_success(s) => {
            return Err(ClientError::Http {
                status,
                body: truncate(body),
            })
        }
        _ => {}
    }

    match mode {
        VoteMode::Toggle => {
            let parsed: ToggleVoteBody = serde_json::from_str(body)
                .map_err(|e| ClientError::Decode(format!("vote response: {e}")))?;
            if parsed.success == Some(false) {
                return Ok(VoteReply::rejected(parsed.error.or(parsed.detail)));
            }
            Ok(match parsed.vote_count {
                Some(votes) => VoteReply::authoritative(VoteState::new(
                    votes,
                    parsed.user_has_voted.unwrap_or(intent),
                )),
                None => VoteReply::accepted(),
            })
        }
        VoteMode::Public => {
            let parsed: PublicVoteBody = serde_json::from_str(body)
                .map_err(|e| ClientError::Decode(format!("public vote response: {e}")))?;
            if !parsed.success {
                return Ok(VoteReply::rejected(parsed.error));
            }
            Ok(match parsed.post {
                Some(post) => VoteReply::authoritative(VoteState::new(
                    post.votes,
                    post.user_has_voted.unwrap_or(intent),
                )),
                None => VoteReply::accepted(),
            })
        }
    }
}

// ── Sign-in and registration ───────────────────────────────────────────

/// Interpret `POST /login/`, returning the session token.
pub fn interpret_login_response(status: u16, body: &str) -> Result<String, ClientError> {
    let data: Value = serde_json::from_str(body).map_err(|_| ClientError::Http {
        status,
        body: truncate(body),
    })?;

    if is_success(status) {
        return match data.get("token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(ClientError::Decode("login response carries no token".into())),
        };
    }

    let message = ["non_field_errors", "error", "detail"]
        .iter()
        .find_map(|field| data.get(*field).and_then(first_message))
        .unwrap_or_else(|| "Login failed. Please check your credentials.".to_string());
    Err(ClientError::Rejected(message))
}

/// Interpret `POST /register/`. Only `201 Created` counts as success.
pub fn interpret_register_response(status: u16, body: &str) -> Result<(), ClientError> {
    if status == 201 {
        return Ok(());
    }
    let data: Value = serde_json::from_str(body).map_err(|_| ClientError::Http {
        status,
        body: truncate(body),
    })?;

    const FIELDS: [(&str, Option<&str>); 6] = [
        ("name", Some("Name")),
        ("email", Some("Email")),
        ("phone_number", Some("Phone")),
        ("password", Some("Password")),
        ("password2", Some("Confirm Password")),
        ("non_field_errors", None),
    ];
    let message = FIELDS
        .iter()
        .find_map(|(field, label)| {
            let msg = data.get(*field).and_then(first_message)?;
            Some(match label {
                Some(label) => format!("{label}: {msg}"),
                None => msg,
            })
        })
        .unwrap_or_else(|| "Registration failed. Please check your information.".to_string());
    Err(ClientError::Rejected(message))
}

// ── Posts ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PostsEnvelope {
    #[serde(default)]
    posts: Vec<PostRecord>,
}

/// One post as the backend sends it. Every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
struct PostRecord {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    votes: Option<i64>,
    #[serde(default)]
    comments_count: Option<i64>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    urgency: Option<String>,
    #[serde(default)]
    user_has_voted: Option<bool>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

fn clamp_count(n: Option<i64>) -> u32 {
    n.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32
}

impl PostRecord {
    /// Fill in the defaults the list screens show for missing fields.
    /// `position` is the 0-based index in the response, used when the
    /// record has no id.
    fn into_post(self, position: usize) -> Post {
        let id = match self.id {
            Some(Value::String(s)) if !s.is_empty() => PostId::from(s),
            Some(Value::Number(n)) => PostId::from(n.to_string()),
            _ => PostId::from((position + 1) as u64),
        };
        Post {
            id,
            title: non_empty(self.title).unwrap_or_else(|| "Untitled Post".into()),
            description: non_empty(self.description)
                .unwrap_or_else(|| "No description available".into()),
            category: self
                .category
                .as_deref()
                .map(Category::from_wire)
                .unwrap_or_default(),
            location: Location::parse(
                &non_empty(self.location).unwrap_or_else(|| "Location not specified".into()),
            ),
            urgency: self
                .urgency
                .as_deref()
                .map(Urgency::from_wire)
                .unwrap_or_default(),
            votes: clamp_count(self.votes),
            comments: clamp_count(self.comments_count),
            created_at: non_empty(self.created_at),
            image_url: non_empty(self.image_url),
            status: non_empty(self.status),
            user_voted: self.user_has_voted,
        }
    }
}

/// Interpret `GET /post/`.
pub fn interpret_posts_response(status: u16, body: &str) -> Result<Vec<Post>, ClientError> {
    match status {
        401 => return Err(ClientError::Unauthorized),
        s if !is_success(s) => {
            return Err(ClientError::Http {
                status,
                body: truncate(body),
            })
        }
        _ => {}
    }
    let envelope: PostsEnvelope = serde_json::from_str(body)
        .map_err(|e| ClientError::Decode(format!("posts response: {e}")))?;
    Ok(envelope
        .posts
        .into_iter()
        .enumerate()
        .map(|(i, record)| record.into_post(i))
        .collect())
}

#[derive(Debug, Deserialize)]
struct CreatePostBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Interpret `POST /post/`, returning the backend's confirmation message.
pub fn interpret_create_post_response(status: u16, body: &str) -> Result<String, ClientError> {
    match status {
        401 => return Err(ClientError::Unauthorized),
        s if !is_success(s) => {
            return Err(ClientError::Http {
                status,
                body: truncate(body),
            })
        }
        _ => {}
    }
    let parsed: CreatePostBody = serde_json::from_str(body)
        .map_err(|e| ClientError::Decode(format!("create post response: {e}")))?;
    if parsed.success {
        Ok(parsed.message.unwrap_or_else(|| "Report submitted".into()))
    } else {
        Err(ClientError::Rejected(
            parsed.error.unwrap_or_else(|| "Failed to submit post".into()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_vote_with_counts_is_authoritative() {
        let reply = interpret_vote_response(
            VoteMode::Toggle,
            true,
            200,
            r#"{"vote_count": 12, "user_has_voted": true}"#,
        )
        .unwrap();
        assert_eq!(reply, VoteReply::authoritative(VoteState::new(12, true)));
    }

    #[test]
    fn toggle_vote_count_without_flag_uses_intent() {
        let reply =
            interpret_vote_response(VoteMode::Toggle, false, 200, r#"{"vote_count": 4}"#).unwrap();
        assert_eq!(reply.server_state, Some(VoteState::new(4, false)));
    }

    #[test]
    fn toggle_vote_without_counts_is_plain_accept() {
        let reply =
            interpret_vote_response(VoteMode::Toggle, true, 200, r#"{"message": "ok"}"#).unwrap();
        assert_eq!(reply, VoteReply::accepted());
    }

    #[test]
    fn toggle_vote_success_false_is_rejected_with_message() {
        let reply = interpret_vote_response(
            VoteMode::Toggle,
            true,
            200,
            r#"{"success": false, "error": "Voting closed"}"#,
        )
        .unwrap();
        assert_eq!(reply, VoteReply::rejected(Some("Voting closed".into())));
    }

    #[test]
    fn public_vote_with_post_is_authoritative() {
        let reply = interpret_vote_response(
            VoteMode::Public,
            true,
            200,
            r#"{"success": true, "post": {"votes": 12, "user_has_voted": true}}"#,
        )
        .unwrap();
        assert_eq!(reply, VoteReply::authoritative(VoteState::new(12, true)));
    }

    #[test]
    fn public_vote_requires_success_field() {
        let err = interpret_vote_response(VoteMode::Public, true, 200, r#"{"post": null}"#)
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn vote_status_mapping() {
        assert_eq!(
            interpret_vote_response(VoteMode::Toggle, true, 401, "").unwrap_err(),
            ClientError::Unauthorized
        );
        assert!(matches!(
            interpret_vote_response(VoteMode::Public, true, 403, "CSRF failed").unwrap_err(),
            ClientError::Forbidden(msg) if msg == "CSRF failed"
        ));
        assert!(matches!(
            interpret_vote_response(VoteMode::Toggle, true, 500, "boom").unwrap_err(),
            ClientError::Http { status: 500, .. }
        ));
    }

    #[test]
    fn html_body_on_success_is_decode_error() {
        let err = interpret_vote_response(VoteMode::Toggle, true, 200, "<html></html>").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn negative_server_count_is_decode_error() {
        let err = interpret_vote_response(VoteMode::Toggle, true, 200, r#"{"vote_count": -1}"#)
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(1000);
        let ClientError::Http { body, .. } =
            interpret_vote_response(VoteMode::Toggle, true, 502, &body).unwrap_err()
        else {
            panic!("expected Http error");
        };
        assert_eq!(body.chars().count(), MAX_ERROR_BODY + 1);
    }

    #[test]
    fn login_returns_token() {
        let token = interpret_login_response(200, r#"{"token": "abc"}"#).unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn login_error_message_precedence() {
        let err = interpret_login_response(
            400,
            r#"{"non_field_errors": ["Invalid credentials"], "detail": "ignored"}"#,
        )
        .unwrap_err();
        assert_eq!(err, ClientError::Rejected("Invalid credentials".into()));

        let err = interpret_login_response(401, r#"{"detail": "Nope"}"#).unwrap_err();
        assert_eq!(err, ClientError::Rejected("Nope".into()));

        let err = interpret_login_response(400, r#"{}"#).unwrap_err();
        assert_eq!(
            err,
            ClientError::Rejected("Login failed. Please check your credentials.".into())
        );
    }

    #[test]
    fn login_non_json_is_http_error() {
        let err = interpret_login_response(500, "Internal Server Error").unwrap_err();
        assert!(matches!(err, ClientError::Http { status: 500, .. }));
    }

    #[test]
    fn login_success_without_token_is_decode_error() {
        let err = interpret_login_response(200, r#"{"user": 1}"#).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn register_field_errors_are_labelled() {
        assert!(interpret_register_response(201, "{}").is_ok());

        let err = interpret_register_response(400, r#"{"email": ["already taken"]}"#).unwrap_err();
        assert_eq!(err, ClientError::Rejected("Email: already taken".into()));

        let err =
            interpret_register_response(400, r#"{"password2": "mismatch"}"#).unwrap_err();
        assert_eq!(err, ClientError::Rejected("Confirm Password: mismatch".into()));

        let err = interpret_register_response(200, r#"{}"#).unwrap_err();
        assert_eq!(
            err,
            ClientError::Rejected("Registration failed. Please check your information.".into())
        );
    }

    #[test]
    fn posts_fill_defaults() {
        let body = r#"{"posts": [
            {"id": 5, "title": "Broken light", "category": "utilities",
             "location": "41.1,-87.6", "votes": 3, "comments_count": 2,
             "created_at": "2025-01-02T03:04:05Z", "urgency": "high"},
            {"title": "", "votes": -4}
        ]}"#;
        let posts = interpret_posts_response(200, body).unwrap();
        assert_eq!(posts.len(), 2);

        let first = &posts[0];
        assert_eq!(first.id, PostId::from("5"));
        assert_eq!(first.category, Category::Utilities);
        assert_eq!(first.location.coordinates(), Some((41.1, -87.6)));
        assert_eq!(first.urgency, Urgency::High);
        assert_eq!((first.votes, first.comments), (3, 2));
        assert_eq!(first.created_date(), Some("2025-01-02"));

        let second = &posts[1];
        assert_eq!(second.id, PostId::from("2"));
        assert_eq!(second.title, "Untitled Post");
        assert_eq!(second.description, "No description available");
        assert_eq!(second.location.to_string(), "Location not specified");
        assert_eq!(second.urgency, Urgency::Medium);
        assert_eq!(second.votes, 0);
        assert_eq!(second.user_voted, None);
    }

    #[test]
    fn posts_missing_list_is_empty() {
        assert!(interpret_posts_response(200, "{}").unwrap().is_empty());
        assert_eq!(
            interpret_posts_response(401, "").unwrap_err(),
            ClientError::Unauthorized
        );
    }

    #[test]
    fn create_post_outcomes() {
        assert_eq!(
            interpret_create_post_response(201, r#"{"success": true, "message": "Thanks!"}"#)
                .unwrap(),
            "Thanks!"
        );
        assert_eq!(
            interpret_create_post_response(200, r#"{"success": false}"#).unwrap_err(),
            ClientError::Rejected("Failed to submit post".into())
        );
        assert_eq!(
            interpret_create_post_response(401, "").unwrap_err(),
            ClientError::Unauthorized
        );
    }
}
