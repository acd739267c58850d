//! # Mock HTTP Clients & Testing Guide
//!
//! Two test doubles implement [`HttpClient`] without touching the network.
//!
//! | Double | Style | Use Case |
//! |--------|-------|----------|
//! | [`MockHttpClient`] | fluent expectations | unit tests of services built on the client |
//! | [`create_mock_http_client`] | channel, answered by hand | holding a response open, ordering races |
//!
//! ## Pattern 1: Expectations
//!
//! Queue one expectation per request, in order. Each expectation fixes the method, the URL
//! and the canned outcome. A request that does not match the next expectation is answered
//! with an [`HttpRequestError`] and left in [`MockHttpClient::requests`] for inspection.
//!
//! ```rust
//! use effect_framework::mock::MockHttpClient;
//! use effect_framework::{HttpClient, HttpRequest, HttpRequestError};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockHttpClient::new();
//!     mock.expect_get("https://dog.ceo/api/breeds/list/all")
//!         .return_json(200, json!({"message": {}}));
//!     mock.expect_get("https://dog.ceo/api/breed/hound/images")
//!         .return_err(HttpRequestError::msg("connection reset"));
//!
//!     let client = mock.client();
//!     let ok = client.send_request(HttpRequest::get("https://dog.ceo/api/breeds/list/all")).await;
//!     assert_eq!(ok.unwrap().status, 200);
//!     let err = client.send_request(HttpRequest::get("https://dog.ceo/api/breed/hound/images")).await;
//!     assert!(err.is_err());
//!
//!     mock.verify(); // every expectation was consumed
//! }
//! ```
//!
//! ## Pattern 2: Answering by Hand
//!
//! ```rust
//! use effect_framework::mock::{create_mock_http_client, expect_request};
//! use effect_framework::{HttpClient, HttpRequest, HttpResponse};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (client, mut receiver) = create_mock_http_client(8);
//!
//!     let pending = tokio::spawn(async move {
//!         client.send_request(HttpRequest::get("http://api.test/slow")).await
//!     });
//!
//!     let (request, respond_to) = expect_request(&mut receiver).await.unwrap();
//!     assert_eq!(request.url, "http://api.test/slow");
//!     respond_to.send(Ok(HttpResponse::new(204, ""))).unwrap();
//!
//!     assert_eq!(pending.await.unwrap().unwrap().status, 204);
//! }
//! ```

use crate::error::HttpRequestError;
use crate::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

struct Expectation {
    method: HttpMethod,
    url: String,
    response: Result<HttpResponse, HttpRequestError>,
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    requests: Vec<HttpRequest>,
}

/// An [`HttpClient`] answering from a queue of expectations.
///
/// Clones share the same queue, so a clone handed to the code under test can be verified
/// through the original.
#[derive(Clone, Default)]
pub struct MockHttpClient {
    state: Arc<Mutex<MockState>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A shareable handle for injecting into services.
    pub fn client(&self) -> Arc<dyn HttpClient> {
        Arc::new(self.clone())
    }

    /// Expects a `GET` of `url`.
    pub fn expect_get(&mut self, url: impl Into<String>) -> ResponseExpectationBuilder {
        self.expect_request(HttpMethod::Get, url)
    }

    pub fn expect_request(
        &mut self,
        method: HttpMethod,
        url: impl Into<String>,
    ) -> ResponseExpectationBuilder {
        ResponseExpectationBuilder {
            method,
            url: url.into(),
            state: self.state.clone(),
        }
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    /// Panics unless every expectation was consumed.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap();
        if !state.expectations.is_empty() {
            let remaining: Vec<String> = state
                .expectations
                .iter()
                .map(|e| format!("{} {}", e.method, e.url))
                .collect();
            panic!(
                "Not all expectations were met. {} remaining: {:?}",
                remaining.len(),
                remaining
            );
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send_request(&self, request: HttpRequest) -> Result<HttpResponse, HttpRequestError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        match state.expectations.pop_front() {
            Some(exp) if exp.method == request.method && exp.url == request.url => exp.response,
            Some(exp) => {
                let message = format!(
                    "unexpected request {} {} (expected {} {})",
                    request.method, request.url, exp.method, exp.url
                );
                state.expectations.push_front(exp);
                Err(HttpRequestError::msg(message))
            }
            None => Err(HttpRequestError::msg(format!(
                "unexpected request {} {} (no expectations left)",
                request.method, request.url
            ))),
        }
    }
}

/// Builder for the outcome of one expected request.
pub struct ResponseExpectationBuilder {
    method: HttpMethod,
    url: String,
    state: Arc<Mutex<MockState>>,
}

impl ResponseExpectationBuilder {
    /// Responds with `value` serialized as the body.
    pub fn return_json(self, status: u16, value: Value) {
        let response = HttpResponse::json(status, &value);
        self.push(Ok(response));
    }

    pub fn return_text(self, status: u16, body: impl Into<String>) {
        let response =
            HttpResponse::new(status, body.into()).with_header("content-type", "text/plain");
        self.push(Ok(response));
    }

    pub fn return_response(self, response: HttpResponse) {
        self.push(Ok(response));
    }

    /// Fails the request at the transport level.
    pub fn return_err(self, error: HttpRequestError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<HttpResponse, HttpRequestError>) {
        let mut state = self.state.lock().unwrap();
        state.expectations.push_back(Expectation {
            method: self.method,
            url: self.url,
            response,
        });
    }
}

// =============================================================================
// CHANNEL HELPERS
// =============================================================================

/// A request waiting for the test to answer it.
pub struct PendingRequest {
    pub request: HttpRequest,
    pub respond_to: oneshot::Sender<Result<HttpResponse, HttpRequestError>>,
}

/// Client half of [`create_mock_http_client`]. Forwards each request to the receiver.
#[derive(Clone)]
pub struct ChannelHttpClient {
    sender: mpsc::Sender<PendingRequest>,
}

#[async_trait]
impl HttpClient for ChannelHttpClient {
    async fn send_request(&self, request: HttpRequest) -> Result<HttpResponse, HttpRequestError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PendingRequest {
                request,
                respond_to,
            })
            .await
            .map_err(|_| HttpRequestError::msg("mock receiver dropped"))?;
        response
            .await
            .map_err(|_| HttpRequestError::msg("mock responder dropped"))?
    }
}

/// Creates a client whose requests surface on the returned receiver.
///
/// Nothing answers automatically: the test decides when and how each request completes,
/// which makes it possible to keep one response in flight while another run starts.
pub fn create_mock_http_client(
    buffer_size: usize,
) -> (ChannelHttpClient, mpsc::Receiver<PendingRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ChannelHttpClient { sender }, receiver)
}

/// Waits for the next request on `receiver`.
pub async fn expect_request(
    receiver: &mut mpsc::Receiver<PendingRequest>,
) -> Option<(
    HttpRequest,
    oneshot::Sender<Result<HttpResponse, HttpRequestError>>,
)> {
    receiver
        .recv()
        .await
        .map(|pending| (pending.request, pending.respond_to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn answers_in_order() {
        let mut mock = MockHttpClient::new();
        mock.expect_get("http://a").return_json(200, json!(1));
        mock.expect_get("http://b").return_text(404, "missing");

        let a = mock.send_request(HttpRequest::get("http://a")).await.unwrap();
        let b = mock.send_request(HttpRequest::get("http://b")).await.unwrap();

        assert_eq!(a.body_as_json().unwrap(), json!(1));
        assert_eq!(b.status, 404);
        assert_eq!(mock.request_count(), 2);
        mock.verify();
    }

    #[tokio::test]
    async fn mismatched_request_keeps_expectation() {
        let mut mock = MockHttpClient::new();
        mock.expect_get("http://a").return_json(200, json!(1));

        let result = mock.send_request(HttpRequest::get("http://other")).await;
        assert!(result.unwrap_err().to_string().contains("unexpected request GET http://other"));
        assert!(mock.send_request(HttpRequest::get("http://a")).await.is_ok());
        mock.verify();
    }

    #[tokio::test]
    async fn method_is_part_of_the_match() {
        let mut mock = MockHttpClient::new();
        mock.expect_request(HttpMethod::Delete, "http://a")
            .return_response(HttpResponse::new(204, ""));

        assert!(mock.send_request(HttpRequest::get("http://a")).await.is_err());
        let ok = mock
            .send_request(HttpRequest::new(HttpMethod::Delete, "http://a"))
            .await
            .unwrap();
        assert_eq!(ok.status, 204);
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn verify_panics_on_leftovers() {
        let mut mock = MockHttpClient::new();
        mock.expect_get("http://never").return_json(200, json!(null));
        mock.verify();
    }

    #[tokio::test]
    async fn channel_client_fails_when_receiver_is_gone() {
        let (client, receiver) = create_mock_http_client(1);
        drop(receiver);
        let result = client.send_request(HttpRequest::get("http://a")).await;
        assert!(result.is_err());
    }
}
