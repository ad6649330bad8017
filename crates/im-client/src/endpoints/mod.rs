//! Typed wrappers, one per REST endpoint the storefront consumes.

mod auth;
mod cart;
mod instruments;
mod orders;

pub use cart::MIN_QUANTITY_MESSAGE;
pub use instruments::{InstrumentQuery, SortOrder};
