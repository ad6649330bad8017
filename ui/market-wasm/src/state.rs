//! Page context and per-page state.
//!
//! [`App`] is built once at start-up and cloned into listeners. Mutable page
//! state lives in a `thread_local!` (WASM is single-threaded).

use std::cell::RefCell;
use std::rc::Rc;

use gloo_utils::window;
use im_api_types::InstrumentId;
use im_client::{ApiClient, ClientConfig};
use im_storefront::SessionContext;

use crate::fetch::FetchTransport;
use crate::storage::BrowserStore;

pub type Client = ApiClient<FetchTransport>;
pub type Session = SessionContext<BrowserStore>;

#[derive(Clone)]
pub struct App {
    pub client: Rc<Client>,
    pub session: Rc<Session>,
}

impl App {
    /// Resolve the API base from the page location and read the session.
    pub fn load() -> Self {
        let location = window().location();
        let config = ClientConfig::for_location(
            &location.protocol().unwrap_or_default(),
            &location.hostname().unwrap_or_default(),
            &location.host().unwrap_or_default(),
        );
        tracing::debug!(api_base = %config.api_base, "client configured");
        Self {
            client: Rc::new(ApiClient::new(FetchTransport, config)),
            session: Rc::new(SessionContext::load(BrowserStore::Session, BrowserStore::Local)),
        }
    }
}

// ── Detail page ──

#[derive(Clone, Debug, Default)]
pub struct DetailState {
    pub instrument: Option<InstrumentId>,
}

thread_local! {
    static DETAIL: RefCell<DetailState> = RefCell::new(DetailState::default());
}

pub fn detail() -> DetailState {
    DETAIL.with(|s| s.borrow().clone())
}

pub fn set_detail(state: DetailState) {
    DETAIL.with(|s| *s.borrow_mut() = state);
}
