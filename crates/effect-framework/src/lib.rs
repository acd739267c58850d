//! # Effect Framework
//!
//! Building blocks for clients that fetch remote JSON, cache it locally and hand the
//! progress of each request to a display layer. Every collaborator is passed in explicitly;
//! nothing reads from ambient globals.
//!
//! ## Architecture Overview
//!
//! ```text
//!  ┌──────────────┐   run(deps, env, effect)   ┌────────────────┐
//!  │ EffectRunner │ ─────────────────────────▶ │  your service   │
//!  └──────┬───────┘                            └───┬────────┬───┘
//!         │ before / error / success / settle      │        │
//!         ▼                                        ▼        ▼
//!  ┌──────────────┐                      ┌──────────────┐ ┌────────────┐
//!  │  RemoteData  │                      │ CacheService │ │ HttpClient │
//!  └──────────────┘                      └──────┬───────┘ └────────────┘
//!                                               ▼
//!                                        ┌──────────────┐
//!                                        │ KeyValueStore│
//!                                        └──────────────┘
//! ```
//!
//! 1. **Contracts** ([`HttpClient`], [`KeyValueStore`], [`Codec`]) - the seams where
//!    transports, storage and representations plug in
//! 2. **Composition** ([`send_json`](http::send_json), [`CacheService`]) - fail-fast pipelines
//!    whose error type is the union of their stages
//! 3. **Presentation** ([`EffectRunner`], [`RemoteData`]) - re-run on dependency change,
//!    report lifecycle transitions, drop stale results
//!
//! ## Core Abstractions
//!
//! ### [`CacheService`] - Read-Through Cache
//!
//! ```rust
//! use effect_framework::{CacheKey, CacheService, HttpJsonError, JsonCodec, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = CacheService::new(MemoryStore::new());
//!     let key = CacheKey::new("greeting").unwrap();
//!
//!     // 1. Miss: the fetch runs and the result is stored
//!     let first: Result<String, HttpJsonError> = cache
//!         .get_with_cache(&key, &JsonCodec::new(), || async { Ok("hello".to_string()) })
//!         .await;
//!     assert_eq!(first.unwrap(), "hello");
//!
//!     // 2. Hit: the stored value wins, the fetch is never started
//!     let second: Result<String, HttpJsonError> = cache
//!         .get_with_cache(&key, &JsonCodec::new(), || async { Ok("ignored".to_string()) })
//!         .await;
//!     assert_eq!(second.unwrap(), "hello");
//! }
//! ```
//!
//! ### [`EffectRunner`] - Lifecycle Binding
//!
//! See the [`runner`] module. Each run carries a cancellation token; re-arming with new
//! dependencies invalidates the previous run so its result is never reported.
//!
//! ## Errors
//!
//! Failures are values. See the [`error`] module for the taxonomy and [`HttpJsonError`] for
//! the union returned by JSON fetches.
//!
//! ## Testing
//!
//! The [`mock`] module provides [`MockHttpClient`](mock::MockHttpClient), a fluent
//! expectation-driven client, and a channel-based client for answering requests by hand.
//! [`MemoryStore`] doubles as the storage fake.

pub mod cache;
pub mod codec;
pub mod error;
pub mod http;
pub mod mock;
pub mod remote_data;
pub mod runner;
pub mod storage;
pub mod tracing;

pub use cache::{CacheKey, CacheKeyError, CacheService, KeyNamespace};
pub use codec::{decode_with_codec, Codec, JsonCodec};
pub use error::{
    ContentType, DecodeError, EncodeError, HttpContentTypeError, HttpJsonError,
    HttpRequestError, HttpResponseStatusError, NotFoundError,
};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use remote_data::{RemoteData, RemoteDataCell};
pub use runner::{EffectHandle, EffectRunner, Lifecycle, RunOutcome};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
