//! Error types for the GitLab API client.
//!
//! # Design
//! Non-2xx statuses are not errors here: they come back inside
//! `HttpResponse` and the caller decides what they mean. Only failures that
//! prevent a round-trip from happening at all (or prevent its body from being
//! read) surface as `ApiError`.

/// Errors returned by `GitLabApiClient`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The joined base URL and path segments do not form a valid URL.
    #[error("malformed URL `{url}`: {source}")]
    MalformedUrl {
        url: String,
        source: url::ParseError,
    },

    /// DNS failure, refused connection, TLS handshake failure, or an I/O
    /// error while reading the response.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// The client configuration was rejected; any previous state is kept.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// The response body is not valid UTF-8.
    #[error("response body is not UTF-8: {0}")]
    Body(#[from] std::str::Utf8Error),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
