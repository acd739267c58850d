//! # HTTP Client Contract
//!
//! [`HttpClient`] is the seam between the framework and the network. It performs exactly one
//! attempt per call and reports transport failures as [`HttpRequestError`] values. It never
//! looks at status codes; that is the job of [`ensure_status_range`].
//!
//! The derived helpers compose into the usual JSON pipeline:
//!
//! ```text
//! send GET ──▶ ensure_2xx ──▶ body_as_json ──▶ decode
//!    │              │               │             │
//!    ▼              ▼               ▼             ▼
//! Request      ResponseStatus   ContentType     Decode      (HttpJsonError variants)
//! ```
//!
//! Each stage short-circuits the rest.
//!
//! ## Example
//!
//! ```rust
//! use effect_framework::http::{get_json, HttpJsonError};
//! use effect_framework::mock::MockHttpClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockHttpClient::new();
//!     mock.expect_get("https://example.test/n").return_json(200, json!([1, 2, 3]));
//!
//!     let numbers: Vec<u32> = get_json(&mock, "https://example.test/n").await.unwrap();
//!     assert_eq!(numbers, vec![1, 2, 3]);
//!
//!     mock.expect_get("https://example.test/n").return_json(503, json!({}));
//!     let err = get_json::<Vec<u32>, _>(&mock, "https://example.test/n").await.unwrap_err();
//!     assert!(matches!(err, HttpJsonError::ResponseStatus(ref e) if e.status == 503));
//!     mock.verify();
//! }
//! ```

use crate::error::{
    ContentType, DecodeError, HttpContentTypeError, HttpRequestError, HttpResponseStatusError,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

pub use crate::error::HttpJsonError;

/// The five request methods the contract knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable request description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// A fully buffered response.
///
/// The body is kept as bytes so [`body_as_json`](Self::body_as_json) and
/// [`body_as_text`](Self::body_as_text) can be called any number of times, in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are stored lowercased.
    pub headers: BTreeMap<String, String>,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// A response whose body is the serialized `value`, tagged `application/json`.
    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, value.to_string()).with_header("content-type", "application/json")
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_as_json(&self) -> Result<Value, HttpContentTypeError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| HttpContentTypeError::new(ContentType::Json, e))
    }

    pub fn body_as_text(&self) -> Result<String, HttpContentTypeError> {
        String::from_utf8(self.body.clone())
            .map_err(|e| HttpContentTypeError::new(ContentType::Text, e))
    }
}

/// Transport contract: one request in, one response or transport failure out.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send_request(&self, request: HttpRequest) -> Result<HttpResponse, HttpRequestError>;
}

#[async_trait]
impl<T: HttpClient + ?Sized> HttpClient for std::sync::Arc<T> {
    async fn send_request(&self, request: HttpRequest) -> Result<HttpResponse, HttpRequestError> {
        (**self).send_request(request).await
    }
}

/// Passes `response` through when `min_inclusive <= status < max_exclusive`.
pub fn ensure_status_range(
    response: HttpResponse,
    min_inclusive: u16,
    max_exclusive: u16,
) -> Result<HttpResponse, HttpResponseStatusError> {
    if (min_inclusive..max_exclusive).contains(&response.status) {
        Ok(response)
    } else {
        Err(HttpResponseStatusError {
            status: response.status,
            response,
            min_inclusive,
            max_exclusive,
        })
    }
}

pub fn ensure_2xx(response: HttpResponse) -> Result<HttpResponse, HttpResponseStatusError> {
    ensure_status_range(response, 200, 300)
}

/// Sends `request` through `client`, logging the outcome.
#[instrument(skip(client, request), fields(method = %request.method, url = %request.url))]
pub async fn send_request<C>(
    client: &C,
    request: HttpRequest,
) -> Result<HttpResponse, HttpRequestError>
where
    C: HttpClient + ?Sized,
{
    debug!("Sending request");
    let result = client.send_request(request).await;
    match &result {
        Ok(response) => debug!(status = response.status, "Received response"),
        Err(e) => debug!(error = %e, "Request failed"),
    }
    result
}

/// GET `url`, require a 2xx status, read the body as JSON and run `decode` on it.
pub async fn send_json<A, C, F>(client: &C, url: &str, decode: F) -> Result<A, HttpJsonError>
where
    C: HttpClient + ?Sized,
    F: FnOnce(&Value) -> Result<A, DecodeError>,
{
    let response = send_request(client, HttpRequest::get(url)).await?;
    let response = ensure_2xx(response)?;
    let json = response.body_as_json()?;
    Ok(decode(&json)?)
}

/// [`send_json`] decoding through the target type's `Deserialize` impl.
pub async fn get_json<A, C>(client: &C, url: &str) -> Result<A, HttpJsonError>
where
    A: DeserializeOwned,
    C: HttpClient + ?Sized,
{
    send_json(client, url, |json| Ok(A::deserialize(json)?)).await
}

/// Production transport backed by `reqwest`.
///
/// Every failure below the HTTP layer (DNS, connection, timeout, body read) is reported as
/// [`HttpRequestError`]. Status codes are returned untouched.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Builds a client whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, HttpRequestError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(HttpRequestError::new)?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send_request(&self, request: HttpRequest) -> Result<HttpResponse, HttpRequestError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(HttpRequestError::new)?;
        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(HttpRequestError::new)?;

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHttpClient;
    use serde_json::json;

    #[test]
    fn status_range_is_half_open() {
        for status in [200, 204, 299] {
            assert!(ensure_2xx(HttpResponse::new(status, "")).is_ok());
        }
        for status in [199, 300, 404, 500] {
            let err = ensure_2xx(HttpResponse::new(status, "")).unwrap_err();
            assert_eq!(err.status, status);
            assert_eq!(err.min_inclusive, 200);
            assert_eq!(err.max_exclusive, 300);
            assert_eq!(err.response.status, status);
        }
    }

    #[test]
    fn custom_status_range() {
        assert!(ensure_status_range(HttpResponse::new(304, ""), 300, 400).is_ok());
        assert!(ensure_status_range(HttpResponse::new(200, ""), 300, 400).is_err());
    }

    #[test]
    fn body_readers_are_replayable() {
        let response = HttpResponse::new(200, "<html>oops</html>");
        let err = response.body_as_json().unwrap_err();
        assert_eq!(err.attempted, ContentType::Json);
        // fall back to text after a failed JSON read
        assert_eq!(response.body_as_text().unwrap(), "<html>oops</html>");
        assert_eq!(response.body_as_text().unwrap(), "<html>oops</html>");
    }

    #[test]
    fn invalid_utf8_is_a_text_content_type_error() {
        let response = HttpResponse::new(200, vec![0xff, 0xfe]);
        let err = response.body_as_text().unwrap_err();
        assert_eq!(err.attempted, ContentType::Text);
    }

    #[test]
    fn headers_are_case_insensitive() {
        let response = HttpResponse::json(200, &json!({})).with_header("X-Trace", "abc");
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("x-trace"), Some("abc"));
        assert_eq!(response.header("X-TRACE"), Some("abc"));
    }

    #[tokio::test]
    async fn send_json_runs_every_stage() {
        let mut mock = MockHttpClient::new();
        mock.expect_get("http://api.test/things")
            .return_json(200, json!({"message": ["a", "b"]}));

        let result = send_json(&mock, "http://api.test/things", |json| {
            json.get("message")
                .and_then(Value::as_array)
                .map(|items| items.len())
                .ok_or_else(|| DecodeError::new("missing message"))
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        mock.verify();
    }

    #[tokio::test]
    async fn send_json_short_circuits_on_transport_failure() {
        let mut mock = MockHttpClient::new();
        mock.expect_get("http://api.test/things")
            .return_err(HttpRequestError::msg("connection refused"));

        let mut decoded = false;
        let result = send_json(&mock, "http://api.test/things", |_| {
            decoded = true;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(HttpJsonError::Request(_))));
        assert!(!decoded);
    }

    #[tokio::test]
    async fn send_json_reports_non_json_bodies() {
        let mut mock = MockHttpClient::new();
        mock.expect_get("http://api.test/things")
            .return_text(200, "not json");

        let result = get_json::<Value, _>(&mock, "http://api.test/things").await;
        assert!(matches!(
            result,
            Err(HttpJsonError::ContentType(HttpContentTypeError {
                attempted: ContentType::Json,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn get_json_reports_shape_mismatch_as_decode_error() {
        let mut mock = MockHttpClient::new();
        mock.expect_get("http://api.test/things")
            .return_json(200, json!({"message": "nope"}));

        let result = get_json::<Vec<String>, _>(&mock, "http://api.test/things").await;
        assert!(matches!(result, Err(HttpJsonError::Decode(_))));
    }

    #[test]
    fn method_names() {
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
        assert_eq!(HttpRequest::get("u").method.to_string(), "GET");
    }
}
