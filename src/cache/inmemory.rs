use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::{cache::Cache, log_debug, method::Method, payload::Payload};

type Buckets = HashMap<Method, HashMap<String, Payload>>;

fn clean_buckets() -> Buckets {
    Method::ALL
        .iter()
        .map(|method| (*method, HashMap::new()))
        .collect()
}

/// In-memory store holding one bucket per HTTP method, each mapping a URL
/// to its parsed payload. Entries never expire; they only go away with a
/// full `reset`.
#[derive(Debug)]
pub struct CacheStore {
    buckets: RwLock<Buckets>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore {
    pub fn new() -> Self {
        CacheStore {
            buckets: RwLock::new(clean_buckets()),
        }
    }

    // A writer that panicked can at worst leave one entry half replaced, so
    // poisoning is ignored.
    fn buckets(&self) -> RwLockReadGuard<'_, Buckets> {
        self.buckets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn buckets_mut(&self) -> RwLockWriteGuard<'_, Buckets> {
        self.buckets.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Owned copy of the whole store for inspection. Changes to it do not
    /// reach the store.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.buckets().clone())
    }

    /// Number of entries across all methods, empty payloads included.
    pub fn len(&self) -> usize {
        self.buckets().values().map(|bucket| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for CacheStore {
    fn save(&self, method: Method, key: &str, value: Payload) {
        self.buckets_mut()
            .entry(method)
            .or_default()
            .insert(key.to_string(), value);
    }

    fn exists(&self, method: Method, key: &str) -> bool {
        self.buckets()
            .get(&method)
            .and_then(|bucket| bucket.get(key))
            .is_some_and(|payload| !payload.is_empty())
    }

    fn read(&self, method: Method, key: &str) -> Option<Payload> {
        self.buckets()
            .get(&method)
            .and_then(|bucket| bucket.get(key))
            .filter(|payload| !payload.is_empty())
            .cloned()
    }

    fn reset(&self) {
        *self.buckets_mut() = clean_buckets();
        log_debug!("Cache store reset");
    }
}

/// Point in time copy of a `CacheStore`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot(Buckets);

impl Snapshot {
    pub fn bucket(&self, method: Method) -> Option<&HashMap<String, Payload>> {
        self.0.get(&method)
    }

    pub fn get(&self, method: Method, key: &str) -> Option<&Payload> {
        self.bucket(method).and_then(|bucket| bucket.get(key))
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.values().map(|bucket| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
