use std::sync::{Arc, Mutex, PoisonError};

use crate::error::FetchError;
use crate::method::Method;
use crate::payload::Payload;
use crate::{log_debug, Result};

pub mod inmemory;

pub use inmemory::{CacheStore, Snapshot};

/// Storage of parsed response payloads keyed by HTTP method and URL.
///
/// Reads treat empty payloads as absent: `exists` is false and `read`
/// returns `None` for them, same as for a key that was never saved.
pub trait Cache {
    /// Inserts or overwrites the entry. Last write wins.
    fn save(&self, method: Method, key: &str, value: Payload);
    fn exists(&self, method: Method, key: &str) -> bool;
    fn read(&self, method: Method, key: &str) -> Option<Payload>;
    /// Discards every entry, leaving one empty bucket per method.
    fn reset(&self);
}

impl<C: Cache + ?Sized> Cache for &C {
    fn save(&self, method: Method, key: &str, value: Payload) {
        (**self).save(method, key, value)
    }

    fn exists(&self, method: Method, key: &str) -> bool {
        (**self).exists(method, key)
    }

    fn read(&self, method: Method, key: &str) -> Option<Payload> {
        (**self).read(method, key)
    }

    fn reset(&self) {
        (**self).reset()
    }
}

impl<C: Cache + ?Sized> Cache for Arc<C> {
    fn save(&self, method: Method, key: &str, value: Payload) {
        (**self).save(method, key, value)
    }

    fn exists(&self, method: Method, key: &str) -> bool {
        (**self).exists(method, key)
    }

    fn read(&self, method: Method, key: &str) -> Option<Payload> {
        (**self).read(method, key)
    }

    fn reset(&self) {
        (**self).reset()
    }
}

lazy_static! {
    static ref PROCESS_STORE: Mutex<Option<Arc<CacheStore>>> = Mutex::new(None);
}

/// Creates the process wide store. Meant to be called once at startup;
/// calling it when the store already exists is a usage error, as it would
/// silently drop everything cached so far. Use `reset` to clear it instead.
pub fn initialize() -> Result<Arc<CacheStore>> {
    let mut store = PROCESS_STORE
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if store.is_some() {
        return Err(FetchError::AlreadyInitialized.into());
    }
    let created = Arc::new(CacheStore::new());
    *store = Some(created.clone());
    log_debug!("Process cache store initialized");
    Ok(created)
}

/// The process wide store, created on first use.
pub fn instance() -> Arc<CacheStore> {
    let mut store = PROCESS_STORE
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    store
        .get_or_insert_with(|| {
            log_debug!("Process cache store created on first use");
            Arc::new(CacheStore::new())
        })
        .clone()
}
