//! Flat string key-value storage (browser session/local storage).

use im_api_types::User;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::warn;

/// Key of the cached user record.
pub const USER_KEY: &str = "user";
/// Key of the URL to return to after login. Consumed once.
pub const REDIRECT_KEY: &str = "redirectUrl";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// In-process store. Used natively and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// Read the cached user. A corrupt record is dropped and treated as absent.
pub fn load_user(store: &impl KeyValueStore) -> Option<User> {
    let raw = store.get(USER_KEY)?;
    match serde_json::from_str::<User>(&raw) {
        Ok(user) => Some(user),
        Err(err) => {
            warn!("discarding unreadable cached user: {err}");
            store.remove(USER_KEY);
            None
        }
    }
}

pub fn save_user(store: &impl KeyValueStore, user: &User) {
    match serde_json::to_string(user) {
        Ok(json) => store.set(USER_KEY, &json),
        Err(err) => warn!("could not serialise user record: {err}"),
    }
}

/// Read and delete the post-login redirect target.
pub fn take_redirect(store: &impl KeyValueStore) -> Option<String> {
    let target = store.get(REDIRECT_KEY).filter(|v| !v.trim().is_empty());
    store.remove(REDIRECT_KEY);
    target
}
