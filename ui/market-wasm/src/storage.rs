//! Browser storage behind the `KeyValueStore` seam.
//!
//! Values are raw strings, matching what the rest of the site writes, so the
//! `gloo-storage` JSON helpers are bypassed for reads and writes.

use gloo_storage::{LocalStorage, SessionStorage, Storage};
use im_client::KeyValueStore;
use tracing::warn;

/// Key of the optional log filter override in local storage.
pub const LOG_FILTER_KEY: &str = "im_log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserStore {
    /// `sessionStorage`, scoped to the tab.
    Session,
    /// `localStorage`.
    Local,
}

impl BrowserStore {
    fn raw(self) -> web_sys::Storage {
        match self {
            BrowserStore::Session => SessionStorage::raw(),
            BrowserStore::Local => LocalStorage::raw(),
        }
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        self.raw().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(err) = self.raw().set_item(key, value) {
            warn!(store = ?self, key, "storage write failed: {err:?}");
        }
    }

    fn remove(&self, key: &str) {
        match self {
            BrowserStore::Session => SessionStorage::delete(key),
            BrowserStore::Local => LocalStorage::delete(key),
        }
    }
}
