//! Runtime wiring and observability.
//!
//! - [`AppEnv`] - builds the transport, the store, the cache and the [`DogApi`](crate::clients::DogApi) from an [`AppConfig`](crate::config::AppConfig)
//! - [`setup_tracing`] - initializes the tracing/logging infrastructure

pub mod app_env;

pub use app_env::*;
pub use effect_framework::tracing::setup_tracing;
