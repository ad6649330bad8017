//! Page logic for the campus instrument marketplace storefront.
//!
//! Controllers talk to the API through [`im_client::ApiClient`] and hand back
//! typed outcomes (notices, redirects, view models). The browser crate
//! applies those to the DOM; tests drive them against a mock transport.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod format;
pub mod outcome;
pub mod render;
pub mod session;
pub mod validate;
pub mod view;

#[cfg(test)]
mod testing;

pub use auth::{
    ACCOUNT_PAGE, AuthController, GuardOutcome, LOGIN_PAGE, NavbarState, PUBLIC_PAGES,
    is_public_page, page_name,
};
pub use cart::{CHECKOUT_PAGE, CartController, CartUpdate, ClearOutcome, EMPTY_CART};
pub use catalog::{
    CatalogController, DetailOutcome, FavoriteOutcome, HOME_PAGE, HomePage, PublishForm,
    SearchParams, SearchResults, login_required, parse_main_image_index, search_href,
};
pub use outcome::{FormOutcome, Navigation, Notice, NoticeKind, Redirect};
pub use session::SessionContext;
pub use validate::ValidationError;
pub use view::{CartLine, CartPage, CategoryTile, DetailView, InstrumentCard, SellerCard};
