#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Breed Browser
//!
//! > **Typed remote data, cached at the edge, rendered from a single state value.**
//!
//! This crate is a small client for the Dog CEO API built on the
//! [`effect_framework`] crate. Every fetch is a typed HTTP call whose failures are a closed
//! set of errors, every read can go through a key-value cache, and every screen renders from
//! a four-state [`RemoteData`](effect_framework::RemoteData) value.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Errors are data
//! A failed request is one of four [`HttpJsonError`](effect_framework::HttpJsonError)
//! variants: the connection failed, the status was outside `2xx`, the body was not JSON,
//! or the JSON did not have the expected shape. Views match on them to pick the message
//! shown to the user (see [`error::user_message`]).
//!
//! ### Cache-aside, never cache-through
//! Clients decide per call whether to consult the cache. A hit skips the network, a miss
//! fetches and stores, and a failed fetch stores nothing. A cached entry that no longer
//! decodes is reported as an error instead of being silently refetched.
//!
//! ### The latest request wins
//! Views start fetches through an [`EffectRunner`](effect_framework::EffectRunner). Starting
//! a new run invalidates the previous one, so a slow response for an old selection can
//! never overwrite the state of a newer one.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Data ([`model`])
//! Plain records and the decoders that map API payloads onto them.
//! - **Key items**: [`Breed`](model::Breed), [`Image`](model::Image), [`Dog`](model::Dog).
//!
//! ### 2. The Interface ([`clients`])
//! - **Role**: One method per endpoint, with a cached twin for each.
//! - **Key items**: [`DogApi`](clients::DogApi), [`BreedService`](clients::BreedService).
//!
//! ### 3. The Wiring ([`config`], [`runtime`])
//! - **Role**: Reads flags and environment variables, then builds the transport, store and
//!   cache once.
//! - **Key items**: [`AppConfig`](config::AppConfig), [`AppEnv`](runtime::AppEnv).
//!
//! ### 4. The Screens ([`views`])
//! - **Key items**: [`BreedsView`](views::BreedsView), [`BreedImagesView`](views::BreedImagesView).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # List breeds with info logs
//! RUST_LOG=info cargo run -- breeds
//!
//! # Skip the cache for one call
//! cargo run -- --no-cache images hound
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test --workspace
//! ```

pub mod clients;
pub mod config;
pub mod error;
pub mod model;
pub mod runtime;
pub mod views;
