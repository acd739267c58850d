//! # Key/Value Store
//!
//! A flat, string-keyed namespace of JSON-serialized values. The contract mirrors a browser's
//! local storage: lookups distinguish "absent" from "empty string", and no operation fails.
//!
//! Two implementations ship with the framework:
//!
//! | Store | Lifetime | Use |
//! |-------|----------|-----|
//! | [`MemoryStore`] | process | tests, short-lived sessions |
//! | [`FileStore`] | survives restarts | the CLI's persistent cache |
//!
//! The free functions layer JSON encoding on top of the raw string contract.

use crate::codec::Codec;
use crate::error::{DecodeError, EncodeError, NotFoundError};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Synchronous string store.
///
/// Calls are plain function calls; async pipelines sequence them like any other statement.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
    fn clear(&self);
    fn size(&self) -> usize;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) {
        (**self).remove_item(key)
    }

    fn clear(&self) {
        (**self).clear()
    }

    fn size(&self) -> usize {
        (**self).size()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory store. Clones share the same namespace.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted snapshot of the current contents.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        lock(&self.items)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        lock(&self.items).get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        lock(&self.items).insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        lock(&self.items).remove(key);
    }

    fn clear(&self) {
        lock(&self.items).clear();
    }

    fn size(&self) -> usize {
        lock(&self.items).len()
    }
}

/// Store persisted as a single JSON object on disk.
///
/// The whole file is loaded by [`open`](Self::open) and rewritten after every mutation.
/// Write failures are logged and otherwise ignored; the in-memory view stays authoritative
/// for the rest of the process.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Loads `path`, treating a missing file as an empty store.
    ///
    /// A file that does not parse is moved aside to `<path>.corrupt` and the store starts
    /// empty. Only read failures are returned.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let items = match std::fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(items) => items,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Discarding unreadable file store");
                    quarantine(&path);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        debug!(path = %path.display(), entries = items.len(), "Opened file store");
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, items: &BTreeMap<String, String>) {
        if let Err(e) = write_atomically(&self.path, items) {
            warn!(path = %self.path.display(), error = %e, "Failed to persist file store");
        }
    }
}

fn quarantine(path: &Path) {
    let mut aside = path.as_os_str().to_owned();
    aside.push(".corrupt");
    if let Err(e) = std::fs::rename(path, &aside) {
        warn!(path = %path.display(), error = %e, "Failed to move unreadable file store aside");
    }
}

fn write_atomically(path: &Path, items: &BTreeMap<String, String>) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(items)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        lock(&self.items).get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        let mut items = lock(&self.items);
        items.insert(key.to_string(), value.to_string());
        self.persist(&items);
    }

    fn remove_item(&self, key: &str) {
        let mut items = lock(&self.items);
        if items.remove(key).is_some() {
            self.persist(&items);
        }
    }

    fn clear(&self) {
        let mut items = lock(&self.items);
        items.clear();
        self.persist(&items);
    }

    fn size(&self) -> usize {
        lock(&self.items).len()
    }
}

/// Reads `key` and decodes it.
///
/// `Ok(None)` means the key is absent. A stored value that is not valid JSON, or that
/// `decode` rejects, is an error rather than a miss.
pub fn get_item_with_decode<S, A, F>(store: &S, key: &str, decode: F) -> Result<Option<A>, DecodeError>
where
    S: KeyValueStore + ?Sized,
    F: FnOnce(&Value) -> Result<A, DecodeError>,
{
    let Some(raw) = store.get_item(key) else {
        return Ok(None);
    };
    let json: Value = serde_json::from_str(&raw)?;
    decode(&json).map(Some)
}

/// Encodes `value`, serializes it and stores it under `key`.
pub fn set_item_with_encode<S, A, F>(
    store: &S,
    key: &str,
    value: &A,
    encode: F,
) -> Result<(), EncodeError>
where
    S: KeyValueStore + ?Sized,
    F: FnOnce(&A) -> Result<Value, EncodeError>,
{
    let json = encode(value)?;
    store.set_item(key, &json.to_string());
    Ok(())
}

pub fn get_item_with_codec<S, A, C>(store: &S, key: &str, codec: &C) -> Result<Option<A>, DecodeError>
where
    S: KeyValueStore + ?Sized,
    C: Codec<A> + ?Sized,
{
    get_item_with_decode(store, key, |json| codec.decode(json))
}

pub fn set_item_with_codec<S, A, C>(store: &S, key: &str, value: &A, codec: &C) -> Result<(), EncodeError>
where
    S: KeyValueStore + ?Sized,
    C: Codec<A> + ?Sized,
{
    set_item_with_encode(store, key, value, |v| codec.encode(v))
}

/// Strict lookup: an absent key is a [`NotFoundError`].
pub fn require_item<S>(store: &S, key: &str) -> Result<String, NotFoundError>
where
    S: KeyValueStore + ?Sized,
{
    store.get_item(key).ok_or_else(|| NotFoundError {
        key: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;

    #[test]
    fn memory_store_distinguishes_absent_from_empty() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("k"), None);
        store.set_item("k", "");
        assert_eq!(store.get_item("k"), Some(String::new()));
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn memory_store_clones_share_state() {
        let a = MemoryStore::new();
        let b = a.clone();
        a.set_item("x", "1");
        assert_eq!(b.get_item("x").as_deref(), Some("1"));
        b.remove_item("x");
        assert_eq!(a.size(), 0);
    }

    #[test]
    fn clear_empties_everything() {
        let store = MemoryStore::new();
        store.set_item("a", "1");
        store.set_item("b", "2");
        store.clear();
        assert_eq!(store.size(), 0);
    }

    #[test]
    fn decode_helper_reports_absent_as_none() {
        let store = MemoryStore::new();
        let codec = JsonCodec::<Vec<u32>>::new();
        assert_eq!(get_item_with_codec(&store, "nums", &codec), Ok(None));
    }

    #[test]
    fn decode_helper_surfaces_malformed_entries() {
        let store = MemoryStore::new();
        let codec = JsonCodec::<Vec<u32>>::new();

        store.set_item("nums", "{not json");
        let err = get_item_with_codec(&store, "nums", &codec).unwrap_err();
        assert!(err.line.is_some());

        store.set_item("nums", r#"{"a": 1}"#);
        let err = get_item_with_codec(&store, "nums", &codec).unwrap_err();
        assert!(err.line.is_none());
    }

    #[test]
    fn encode_helper_stores_json_text() {
        let store = MemoryStore::new();
        let codec = JsonCodec::<Vec<u32>>::new();
        set_item_with_codec(&store, "nums", &vec![1, 2], &codec).unwrap();
        assert_eq!(store.get_item("nums").as_deref(), Some("[1,2]"));
        assert_eq!(get_item_with_codec(&store, "nums", &codec), Ok(Some(vec![1, 2])));
    }

    #[test]
    fn require_item_fails_with_not_found() {
        let store = MemoryStore::new();
        assert_eq!(
            require_item(&store, "dogs"),
            Err(NotFoundError {
                key: "dogs".to_string()
            })
        );
        store.set_item("dogs", "[]");
        assert_eq!(require_item(&store, "dogs").as_deref(), Ok("[]"));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.size(), 0);
        store.set_item("breeds", "[]");
        store.set_item("dogs", "[1]");
        store.remove_item("dogs");
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_item("breeds").as_deref(), Some("[]"));
        assert_eq!(reopened.get_item("dogs"), None);
        assert_eq!(reopened.size(), 1);
    }

    #[test]
    fn file_store_opens_empty_over_a_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"breeds": "#).unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.size(), 0);
        assert!(dir.path().join("storage.json.corrupt").exists());

        store.set_item("a", "1");
        store.clear();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.size(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "{}");
    }
}
