//! HTTP client for the campus instrument marketplace API.
//!
//! [`ApiClient`] owns the request/session protocol (fresh CSRF token per
//! call, credentialed requests, one error taxonomy). The byte-moving half is
//! the [`Transport`] trait: `ReqwestTransport` natively, a `fetch`-based one
//! in the browser crate, [`mock::MockTransport`] in tests.

mod client;
mod config;
mod endpoints;
mod error;
#[cfg(feature = "native")]
mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod storage;
mod transport;

pub use client::{ApiClient, CSRF_ENDPOINT, CSRF_HEADER, RequestOptions};
pub use config::{
    AUTH_TIMEOUT, ClientConfig, LOCAL_API_BASE, LONG_REDIRECT_DELAY, NOT_FOUND_REDIRECT_DELAY,
    SHORT_REDIRECT_DELAY,
};
pub use endpoints::{InstrumentQuery, MIN_QUANTITY_MESSAGE, SortOrder};
pub use error::{ApiError, NETWORK_MESSAGE, REJECTED_MESSAGE, TIMEOUT_MESSAGE, TransportError};
#[cfg(feature = "native")]
pub use http::ReqwestTransport;
pub use storage::{
    KeyValueStore, MemoryStore, REDIRECT_KEY, USER_KEY, load_user, save_user, take_redirect,
};
pub use transport::{
    Body, FilePart, HttpRequest, HttpResponse, Method, MultipartForm, Transport,
};
