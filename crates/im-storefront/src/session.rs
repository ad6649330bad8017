//! Per-page session context.
//!
//! Read once when a page starts and passed to the controllers. The cached
//! user is advisory only; the server session decides who is signed in.

use im_api_types::{ProfileUpdate, User};
use im_client::{KeyValueStore, REDIRECT_KEY, USER_KEY, load_user, save_user, take_redirect};
use std::cell::RefCell;
use tracing::debug;

pub struct SessionContext<S> {
    /// Tab-scoped storage (`sessionStorage` in the browser).
    session: S,
    /// Durable storage (`localStorage`). Only ever cleared here.
    durable: S,
    user: RefCell<Option<User>>,
}

impl<S: KeyValueStore> SessionContext<S> {
    pub fn load(session: S, durable: S) -> Self {
        let user = load_user(&session);
        Self {
            session,
            durable,
            user: RefCell::new(user),
        }
    }

    pub fn user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.borrow().is_some()
    }

    pub fn sign_in(&self, user: User) {
        debug!(user = %user.username, "caching signed-in user");
        save_user(&self.session, &user);
        *self.user.borrow_mut() = Some(user);
    }

    /// Forget the user in both stores.
    pub fn sign_out(&self) {
        self.session.remove(USER_KEY);
        self.durable.remove(USER_KEY);
        *self.user.borrow_mut() = None;
    }

    /// Merge submitted profile fields into the cached record, if any.
    pub fn apply_profile(&self, update: &ProfileUpdate) {
        let mut cached = self.user.borrow_mut();
        if let Some(user) = cached.as_mut() {
            update.apply_to(user);
            save_user(&self.session, user);
        }
    }

    pub fn remember_return_url(&self, url: &str) {
        self.session.set(REDIRECT_KEY, url);
    }

    pub fn take_return_url(&self) -> Option<String> {
        take_redirect(&self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im_api_types::{Role, UserId};
    use im_client::MemoryStore;
    use std::rc::Rc;

    fn user() -> User {
        User {
            id: UserId(3),
            username: "wang".into(),
            email: None,
            role: Role::User,
            avatar: None,
            real_name: None,
            phone: None,
            student_id: None,
            credit_score: None,
            is_seller: false,
            is_admin: false,
        }
    }

    #[test]
    fn sign_out_clears_both_stores() {
        let session = Rc::new(MemoryStore::new());
        let durable = Rc::new(MemoryStore::new());
        durable.set(USER_KEY, "{}");

        let ctx = SessionContext::load(session.clone(), durable.clone());
        assert!(!ctx.is_signed_in());
        ctx.sign_in(user());
        assert!(session.get(USER_KEY).is_some());

        ctx.sign_out();
        assert!(session.get(USER_KEY).is_none());
        assert!(durable.get(USER_KEY).is_none());
        assert!(!ctx.is_signed_in());
    }

    #[test]
    fn profile_fields_merge_into_cached_user() {
        let session = Rc::new(MemoryStore::new());
        let ctx = SessionContext::load(session.clone(), Rc::new(MemoryStore::new()));
        ctx.sign_in(user());

        ctx.apply_profile(&ProfileUpdate {
            real_name: Some("王芳".into()),
            phone: Some("  ".into()),
            student_id: None,
        });

        let reloaded = SessionContext::load(session, Rc::new(MemoryStore::new()));
        let cached = reloaded.user().expect("user cached");
        assert_eq!(cached.real_name.as_deref(), Some("王芳"));
        assert_eq!(cached.phone, None);
    }
}
