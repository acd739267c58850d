//! # Framework Errors
//!
//! Every failure the framework can produce is a value of one of the types below. Nothing
//! here is thrown across a contract boundary: each stage returns a `Result` carrying exactly
//! one error kind, and composed pipelines widen into [`HttpJsonError`] through `From`
//! conversions so that `?` does the union for us.
//!
//! | Type | Raised by | Meaning |
//! |------|-----------|---------|
//! | [`HttpRequestError`] | [`HttpClient::send_request`](crate::HttpClient::send_request) | transport failed (DNS, refused, timeout, aborted) |
//! | [`HttpResponseStatusError`] | [`ensure_status_range`](crate::http::ensure_status_range) | status outside `[min, max)` |
//! | [`HttpContentTypeError`] | [`HttpResponse::body_as_json`](crate::HttpResponse::body_as_json) | body unreadable as the requested representation |
//! | [`DecodeError`] | [`Codec::decode`](crate::Codec::decode) | JSON shape does not match the expected type |
//! | [`NotFoundError`] | [`require_item`](crate::storage::require_item) | strict lookup of an absent key |

use crate::http::HttpResponse;
use std::fmt;
use std::sync::Arc;

/// Opaque underlying cause, shared so that errors stay cheap to clone.
pub type BoxedCause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// The transport underneath an [`HttpClient`](crate::HttpClient) failed.
///
/// Not retried by anything in this crate; callers retry by re-invoking.
#[derive(Debug, Clone, thiserror::Error)]
#[error("HTTP request failed: {source}")]
pub struct HttpRequestError {
    #[source]
    pub source: BoxedCause,
}

impl HttpRequestError {
    pub fn new(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Builds a request error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(std::io::Error::other(message.into()))
    }
}

/// A response arrived with a status outside the caller's accepted range.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unexpected HTTP status {status} (expected {min_inclusive}..{max_exclusive})")]
pub struct HttpResponseStatusError {
    pub response: HttpResponse,
    pub status: u16,
    pub min_inclusive: u16,
    pub max_exclusive: u16,
}

/// Representation a response body was read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Text,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Json => write!(f, "json"),
            ContentType::Text => write!(f, "text"),
        }
    }
}

/// A response body could not be read as the requested representation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("response body is not valid {attempted}: {source}")]
pub struct HttpContentTypeError {
    pub attempted: ContentType,
    #[source]
    pub source: BoxedCause,
}

impl HttpContentTypeError {
    pub fn new(
        attempted: ContentType,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            attempted,
            source: Arc::new(source),
        }
    }
}

/// Structural mismatch between a JSON document and the expected shape.
///
/// `line` and `column` are only present when the failure was located in a JSON text
/// (e.g. a corrupted storage entry); decoding an in-memory `Value` has no position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("decode failed: {message}")]
pub struct DecodeError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        let located = e.line() > 0;
        Self {
            message: e.to_string(),
            line: located.then(|| e.line()),
            column: located.then(|| e.column()),
        }
    }
}

/// A value could not be turned into JSON.
#[derive(Debug, Clone, thiserror::Error)]
#[error("encode failed: {message}")]
pub struct EncodeError {
    pub message: String,
}

impl From<serde_json::Error> for EncodeError {
    fn from(e: serde_json::Error) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

/// A strict storage lookup found nothing under `key`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no stored item for key '{key}'")]
pub struct NotFoundError {
    pub key: String,
}

/// Everything that can go wrong fetching and decoding a JSON resource.
///
/// This is the error of [`send_json`](crate::http::send_json) and of every cached read
/// built on top of it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HttpJsonError {
    #[error(transparent)]
    Request(#[from] HttpRequestError),
    #[error(transparent)]
    ResponseStatus(#[from] HttpResponseStatusError),
    #[error(transparent)]
    ContentType(#[from] HttpContentTypeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
