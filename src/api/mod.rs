//! HTTP client for the FreeAPI social-media service
//!
//! Every response is wrapped in the same envelope:
//!
//! ```text
//! { "statusCode": 200, "data": { ... }, "message": "...", "success": true }
//! ```
//!
//! [`ApiClient`] unwraps `data` on success and turns the envelope's
//! `message` into an [`ApiError`] otherwise. When a bearer token is held it
//! is attached to every request.

mod comments;
mod follow;
mod posts;
mod profile;
mod users;

pub use posts::NewPost;
pub use users::Registration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.freeapi.app/api/v1";

/// Errors returned by [`ApiClient`]
#[derive(Debug, Error)]
pub enum ApiError {
    /// An authenticated endpoint was called without a token
    #[error("Not logged in")]
    NotLoggedIn,

    /// The server rejected the token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The server answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message from the response envelope, or the HTTP reason
        message: String,
    },

    /// The request never got a response
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the expected JSON
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A success envelope without `data`
    #[error("Response contained no data")]
    EmptyResponse,

    /// A local file (image upload) could not be read
    #[error("Could not read {path}: {source}")]
    File {
        /// Path of the file
        path: String,
        /// Underlying error
        source: std::io::Error,
    },
}

impl ApiError {
    /// Whether the session should be dropped
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::NotLoggedIn)
    }

    /// The server's message when there is one, otherwise the error text
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } | Self::Unauthorized(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result alias for API calls
pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// FreeAPI client with bearer-token injection
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl ApiClient {
    /// Create a client for the given API root
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    /// Attach a bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Replace (or drop) the bearer token
    pub fn set_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    /// The bearer token, if any
    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// The API root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build API URL
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Request that attaches the token when one is held
    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        tracing::debug!("{method} {endpoint}");
        let builder = self.client.request(method, self.api_url(endpoint));
        match &self.access_token {
            Some(token) => builder.header("Authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Request that requires a token
    fn authed(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        if self.access_token.is_none() {
            return Err(ApiError::NotLoggedIn);
        }
        Ok(self.request(method, endpoint))
    }

    /// Send a request and unwrap the envelope's `data`
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let envelope: Envelope<T> = self.send_envelope(builder).await?;
        envelope.data.ok_or(ApiError::EmptyResponse)
    }

    /// Send a request whose `data` is irrelevant, returning the message
    async fn send_unit(&self, builder: RequestBuilder) -> Result<String> {
        let envelope: Envelope<serde_json::Value> = self.send_envelope(builder).await?;
        Ok(envelope.message)
    }

    async fn send_envelope<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Envelope<T>> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .map(|b| b.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                });
            tracing::debug!("request failed with {status}: {message}");
            if status == StatusCode::UNAUTHORIZED {
                return Err(ApiError::Unauthorized(message));
            }
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

/// `?page=N&limit=M` suffix
fn page_query(page: u32, limit: u32) -> String {
    format!("page={}&limit={}", page.max(1), limit.max(1))
}

/// Percent-encode a user-supplied path segment
fn segment(value: &str) -> String {
    urlencoding::encode(value.trim()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_joins_cleanly() {
        let client = ApiClient::new("https://api.freeapi.app/api/v1/");
        assert_eq!(
            client.api_url("users/login"),
            "https://api.freeapi.app/api/v1/users/login"
        );
        assert_eq!(
            client.api_url("/social-media/posts"),
            "https://api.freeapi.app/api/v1/social-media/posts"
        );
    }

    #[test]
    fn test_authed_requires_token() {
        let client = ApiClient::new(DEFAULT_BASE_URL);
        assert!(matches!(
            client.authed(Method::GET, "social-media/profile"),
            Err(ApiError::NotLoggedIn)
        ));
        let client = client.with_token("t");
        assert!(client.authed(Method::GET, "social-media/profile").is_ok());
    }

    #[test]
    fn test_page_query_clamps() {
        assert_eq!(page_query(0, 0), "page=1&limit=1");
        assert_eq!(page_query(2, 10), "page=2&limit=10");
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ApiError::Status {
            status: 409,
            message: "User with email or username already exists".to_string(),
        };
        assert_eq!(err.user_message(), "User with email or username already exists");
        assert!(!err.is_unauthorized());
        assert!(ApiError::NotLoggedIn.is_unauthorized());
    }
}
