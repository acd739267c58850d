//! # Read-Through Cache
//!
//! [`CacheService`] puts a [`KeyValueStore`] in front of any fallible async computation:
//!
//! 1. Look the key up and decode it with the caller's codec.
//! 2. Hit: return the decoded value. The fetch is never started.
//! 3. Stored value fails to decode: return the [`DecodeError`]. A corrupted entry is
//!    surfaced, not silently refetched.
//! 4. Miss: run the fetch. On success the value is encoded and written back, then returned.
//!    A failed write is logged and does not affect the result.
//! 5. Fetch failure: the error is returned as-is and the store is not touched.
//!
//! Concurrent misses for the same key are not de-duplicated. Both callers fetch and both
//! write; the last write wins.
//!
//! ## Keys
//!
//! Keys are structured as `namespace` or `namespace-scope`, e.g. `breeds` or
//! `breedImages-hound`. Namespaces are checked so that one namespace can never render as a
//! prefix of another: they may not be empty and may not contain `-` or `:`. A service built
//! [`with_prefix`](CacheService::with_prefix) stores every key as `prefix:key`.

use crate::codec::Codec;
use crate::error::DecodeError;
use crate::storage::{get_item_with_codec, set_item_with_codec, KeyValueStore};
use std::fmt;
use std::future::Future;
use tracing::{debug, instrument, warn};

/// Separates a namespace from its scope.
pub const SCOPE_SEPARATOR: char = '-';
/// Separates a service prefix from the key.
pub const PREFIX_SEPARATOR: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheKeyError {
    #[error("cache key namespace must not be empty")]
    EmptyNamespace,
    #[error("cache key namespace '{0}' contains a reserved separator")]
    ReservedInNamespace(String),
    #[error("cache prefix '{0}' contains the reserved separator ':'")]
    ReservedInPrefix(String),
}

const fn is_valid_namespace(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'-' || bytes[i] == b':' {
            return false;
        }
        i += 1;
    }
    true
}

/// A namespace checked at compile time.
///
/// ```rust
/// use effect_framework::cache::KeyNamespace;
///
/// const BREED_IMAGES: KeyNamespace = KeyNamespace::new("breedImages");
/// assert_eq!(BREED_IMAGES.scoped("hound").to_string(), "breedImages-hound");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyNamespace(&'static str);

impl KeyNamespace {
    /// Intended for `const` items, where an invalid name fails the build.
    pub const fn new(name: &'static str) -> Self {
        assert!(
            is_valid_namespace(name),
            "cache key namespace must be non-empty and free of '-' and ':'"
        );
        Self(name)
    }

    pub fn key(&self) -> CacheKey {
        CacheKey {
            namespace: self.0.to_string(),
            scope: None,
        }
    }

    pub fn scoped(&self, scope: impl fmt::Display) -> CacheKey {
        CacheKey {
            namespace: self.0.to_string(),
            scope: Some(scope.to_string()),
        }
    }
}

/// A structured storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: String,
    scope: Option<String>,
}

impl CacheKey {
    pub fn new(namespace: impl Into<String>) -> Result<Self, CacheKeyError> {
        let namespace = namespace.into();
        validate_namespace(&namespace)?;
        Ok(Self {
            namespace,
            scope: None,
        })
    }

    pub fn scoped(
        namespace: impl Into<String>,
        scope: impl fmt::Display,
    ) -> Result<Self, CacheKeyError> {
        let mut key = Self::new(namespace)?;
        key.scope = Some(scope.to_string());
        Ok(key)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}

fn validate_namespace(namespace: &str) -> Result<(), CacheKeyError> {
    if namespace.is_empty() {
        Err(CacheKeyError::EmptyNamespace)
    } else if !is_valid_namespace(namespace) {
        Err(CacheKeyError::ReservedInNamespace(namespace.to_string()))
    } else {
        Ok(())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}{}{}", self.namespace, SCOPE_SEPARATOR, scope),
            None => f.write_str(&self.namespace),
        }
    }
}

/// Cache-aside reads over a key/value store.
#[derive(Debug, Clone)]
pub struct CacheService<S> {
    store: S,
    prefix: Option<String>,
}

impl<S: KeyValueStore> CacheService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            prefix: None,
        }
    }

    /// Namespaces every key under `prefix`. An empty prefix means none.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Result<Self, CacheKeyError> {
        let prefix = prefix.into();
        if prefix.contains(PREFIX_SEPARATOR) {
            return Err(CacheKeyError::ReservedInPrefix(prefix));
        }
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        Ok(self)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The literal string `key` is stored under.
    pub fn storage_key(&self, key: &CacheKey) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{PREFIX_SEPARATOR}{key}"),
            None => key.to_string(),
        }
    }

    /// Returns the cached value for `key`, or runs `fetch` and caches its result.
    #[instrument(skip_all, fields(key = %key))]
    pub async fn get_with_cache<A, E, C, F, Fut>(
        &self,
        key: &CacheKey,
        codec: &C,
        fetch: F,
    ) -> Result<A, E>
    where
        C: Codec<A> + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<A, E>>,
        E: From<DecodeError>,
    {
        let storage_key = self.storage_key(key);

        match get_item_with_codec(&self.store, &storage_key, codec) {
            Ok(Some(value)) => {
                debug!("Cache hit");
                return Ok(value);
            }
            Ok(None) => debug!("Cache miss"),
            Err(e) => {
                warn!(error = %e, "Cached entry failed to decode");
                return Err(E::from(e));
            }
        }

        let value = fetch().await?;

        if let Err(e) = set_item_with_codec(&self.store, &storage_key, &value, codec) {
            warn!(error = %e, "Skipping cache write");
        }
        Ok(value)
    }

    /// Drops the entry for `key`, forcing the next read to fetch.
    pub fn invalidate(&self, key: &CacheKey) {
        self.store.remove_item(&self.storage_key(key));
    }

    /// Clears the whole underlying store, including entries written under other prefixes.
    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn size(&self) -> usize {
        self.store.size()
    }
}
