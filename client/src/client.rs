//! HTTP client for the civic backend.

use std::time::Duration;

use civic_types::{Post, PostId};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Url};

use crate::report::{NewPost, Registration};
use crate::wire;
use crate::{ClientConfig, ClientError, VoteEndpoint, VoteMode, VoteReply};

/// HTTP client for the civic backend.
///
/// Wraps `reqwest::Client` with the backend's base URL and the chosen vote
/// contract, and provides typed methods for each call the app makes.
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    vote_mode: VoteMode,
}

impl BackendClient {
    /// Create a client targeting `base_url` (e.g. `http://127.0.0.1:8000`).
    pub fn new(
        base_url: impl Into<String>,
        vote_mode: VoteMode,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Config("backend base URL is empty".into()));
        }
        let parsed = Url::parse(&base_url)
            .map_err(|e| ClientError::Config(format!("invalid backend base URL {base_url:?}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "backend base URL {base_url:?} cannot carry a path"
            )));
        }
        Ok(Self {
            http,
            base_url,
            vote_mode,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(
            config.base_url.clone(),
            config.vote_mode,
            config.request_timeout(),
            config.connect_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn vote_mode(&self) -> VoteMode {
        self.vote_mode
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `<base>/api/posts/<post>/<action>/`, with the post id escaped as a
    /// single path segment.
    fn post_action_url(&self, post: &PostId, action: &str) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("invalid backend base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::Config("backend base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(["api", "posts", post.as_str(), action, ""]);
        Ok(url)
    }

    /// Send a request and hand back `(status, body)`. Only transport
    /// failures are errors here; status handling is left to `wire`.
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<(u16, String), ClientError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(call = what, error = %e, "backend request failed");
            ClientError::Request(e.to_string())
        })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Request(format!("failed to read {what} response: {e}")))?;
        tracing::debug!(call = what, status, bytes = body.len(), "backend responded");
        Ok((status, body))
    }

    fn with_token(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.header(AUTHORIZATION, format!("Token {token}")),
            None => request,
        }
    }

    /// Cast a vote on `post` using the configured contract.
    ///
    /// `vote` is the intended direction (`true` = vote, `false` = unvote).
    /// The toggle contract only sends the token; the public contract only
    /// sends the direction.
    pub async fn vote(
        &self,
        post: &PostId,
        vote: bool,
        token: Option<&str>,
    ) -> Result<VoteReply, ClientError> {
        let request = match self.vote_mode {
            VoteMode::Toggle => {
                Self::with_token(self.http.post(self.post_action_url(post, "vote")?), token)
            }
            VoteMode::Public => self
                .http
                .post(self.post_action_url(post, "public_vote")?)
                .json(&serde_json::json!({ "vote": vote })),
        };
        let (status, body) = self.send(request, "vote").await?;
        wire::interpret_vote_response(self.vote_mode, vote, status, &body)
    }

    /// Sign in and return the session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ClientError> {
        let request = self
            .http
            .post(self.url("/login/"))
            .json(&serde_json::json!({ "email": email, "password": password }));
        let (status, body) = self.send(request, "login").await?;
        wire::interpret_login_response(status, &body)
    }

    /// Create an account. The user signs in separately afterwards.
    pub async fn register(&self, registration: &Registration) -> Result<(), ClientError> {
        let request = self.http.post(self.url("/register/")).json(registration);
        let (status, body) = self.send(request, "register").await?;
        wire::interpret_register_response(status, &body)
    }

    /// Fetch the posts visible to the signed-in user.
    pub async fn list_posts(&self, token: Option<&str>) -> Result<Vec<Post>, ClientError> {
        let request = Self::with_token(self.http.get(self.url("/post/")), token);
        let (status, body) = self.send(request, "list_posts").await?;
        wire::interpret_posts_response(status, &body)
    }

    /// File a new report as a multipart form, returning the backend's message.
    pub async fn create_post(
        &self,
        token: Option<&str>,
        post: NewPost,
    ) -> Result<String, ClientError> {
        let mut form = Form::new()
            .text("title", post.title)
            .text("description", post.description)
            .text("location", String::from(post.location))
            .text("category", post.category.as_str())
            .text("urgency", post.urgency.as_str());
        if let Some(image) = post.image {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.mime_type)
                .map_err(|e| ClientError::Config(format!("invalid image type: {e}")))?;
            form = form.part("image", part);
        }
        let request = Self::with_token(self.http.post(self.url("/post/")), token).multipart(form);
        let (status, body) = self.send(request, "create_post").await?;
        wire::interpret_create_post_response(status, &body)
    }
}

impl VoteEndpoint for BackendClient {
    async fn cast_vote(
        &self,
        post: &PostId,
        vote: bool,
        token: Option<&str>,
    ) -> Result<VoteReply, ClientError> {
        self.vote(post, vote, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> Result<BackendClient, ClientError> {
        BackendClient::new(
            url,
            VoteMode::Toggle,
            Duration::from_secs(10),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let c = client("http://127.0.0.1:8000/").unwrap();
        assert_eq!(c.base_url(), "http://127.0.0.1:8000");
        assert_eq!(c.url("/login/"), "http://127.0.0.1:8000/login/");
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(matches!(client("/"), Err(ClientError::Config(_))));
        assert!(matches!(client("not a url"), Err(ClientError::Config(_))));
    }

    #[test]
    fn vote_url_keeps_post_id_in_one_segment() {
        let c = client("http://127.0.0.1:8000").unwrap();
        assert_eq!(
            c.post_action_url(&PostId::from("17"), "vote").unwrap().as_str(),
            "http://127.0.0.1:8000/api/posts/17/vote/"
        );
        assert_eq!(
            c.post_action_url(&PostId::from("a/b?c#d"), "public_vote")
                .unwrap()
                .as_str(),
            "http://127.0.0.1:8000/api/posts/a%2Fb%3Fc%23d/public_vote/"
        );
    }

    #[test]
    fn vote_url_under_a_path_prefix() {
        let c = client("http://example.org/civic/").unwrap();
        assert_eq!(
            c.post_action_url(&PostId::from("5"), "vote").unwrap().as_str(),
            "http://example.org/civic/api/posts/5/vote/"
        );
    }

    #[test]
    fn from_config_takes_vote_mode() {
        let config = ClientConfig {
            vote_mode: VoteMode::Public,
            ..ClientConfig::default()
        };
        let c = BackendClient::from_config(&config).unwrap();
        assert_eq!(c.vote_mode(), VoteMode::Public);
    }
}
