//! Process-wide proxy setting.
//!
//! Every fetch attempt that was not given explicit proxies reads the value
//! stored here at the moment the attempt starts, so changes made between
//! calls are honored. The value is meant to be configured once at startup or
//! overridden around a block of calls with [`with_proxies`]. Concurrent
//! writers are last-write-wins; code that needs per-thread proxies should
//! pass them explicitly through [`FetchOptions`](crate::http::FetchOptions).

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

static PROXIES: RwLock<Option<Proxies>> = RwLock::new(None);

/// Scheme to proxy URL mapping, e.g. `{"http": "...", "https": "..."}`.
///
/// The `all` key applies to every scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proxies(BTreeMap<String, String>);

impl Proxies {
    pub fn new() -> Self {
        Self::default()
    }

    /// The same proxy for both `http` and `https`.
    pub fn single(url: impl Into<String>) -> Self {
        let url = url.into();
        Self::new().with("http", url.clone()).with("https", url)
    }

    pub fn with(mut self, scheme: impl Into<String>, url: impl Into<String>) -> Self {
        self.0.insert(scheme.into(), url.into());
        self
    }

    pub fn get(&self, scheme: &str) -> Option<&str> {
        self.0.get(scheme).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// The stored value is plain data, so a writer that panicked cannot leave it
// half-updated. Recover from poisoning instead of propagating it.
fn read_lock() -> RwLockReadGuard<'static, Option<Proxies>> {
    PROXIES.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock() -> RwLockWriteGuard<'static, Option<Proxies>> {
    PROXIES.write().unwrap_or_else(|e| e.into_inner())
}

/// Replaces the process-wide proxy setting.
pub fn set_proxies(proxies: Option<Proxies>) {
    debug!("Setting global proxies to {:?}", proxies);
    *write_lock() = proxies;
}

/// Returns the current process-wide proxy setting.
pub fn get_proxies() -> Option<Proxies> {
    read_lock().clone()
}

/// Sets `proxies` until the returned guard is dropped, then restores
/// whatever was active before, on every exit path including unwinding.
pub fn with_proxies(proxies: Option<Proxies>) -> ProxyOverride {
    let previous = std::mem::replace(&mut *write_lock(), proxies);
    debug!("Overriding global proxies (previous: {:?})", previous);
    ProxyOverride { previous }
}

/// Runs `f` with `proxies` active.
pub fn scoped_proxies<T>(proxies: Option<Proxies>, f: impl FnOnce() -> T) -> T {
    let _guard = with_proxies(proxies);
    f()
}

/// Guard returned by [`with_proxies`].
#[must_use = "the previous proxy setting is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ProxyOverride {
    previous: Option<Proxies>,
}

impl Drop for ProxyOverride {
    fn drop(&mut self) {
        let previous = self.previous.take();
        debug!("Restoring global proxies to {:?}", previous);
        *write_lock() = previous;
    }
}
