//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **HTTP**: one span per request carrying `method` and `url`, plus the observed status
//! - **Cache**: one span per read carrying the `key`; hit, miss, decode failure, skipped write
//! - **Runner**: run start, skip on unchanged dependencies, stale completions dropped
//! - **File store**: open and persistence failures
//!
//! ## Usage
//!
//! ```bash
//! # Quiet
//! RUST_LOG=warn cargo run -- breeds
//!
//! # Watch the cache work
//! RUST_LOG=effect_framework::cache=debug cargo run -- breeds
//! ```
//!
//! ```text
//! DEBUG get_with_cache{key=breeds}: Cache miss
//! DEBUG get_with_cache{key=breeds}:send_request{method=GET url=https://dog.ceo/api/breeds/list/all}: Sending request
//! DEBUG get_with_cache{key=breeds}:send_request{method=GET url=https://dog.ceo/api/breeds/list/all}: Received response status=200
//! ```

/// Installs the global subscriber. Later calls are no-ops.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
