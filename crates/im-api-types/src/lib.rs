//! Wire types shared by the marketplace client crates.
//!
//! Every struct here mirrors a JSON payload produced by the marketplace REST
//! API. Optional server fields are `Option`/`#[serde(default)]` so that a
//! sparse payload still decodes.

mod auth;
mod cart;
mod instrument;
mod order;
mod price;

pub use auth::{
    AuthStatus, ChangePasswordRequest, CsrfTokenResponse, LoginRequest, LoginResponse,
    ProfileUpdate, RegisterRequest, RegisterResponse, Role, User, UserId,
};
pub use cart::{AddToCartRequest, AddToCartResponse, Cart, CartItem, CartItemId, UpdateCartRequest};
pub use instrument::{
    Category, CategoryId, CategoryList, Condition, FavoriteToggle, Instrument, InstrumentId,
    InstrumentImage, InstrumentList, InstrumentResponse, InstrumentStatus, Pagination,
    PublishResponse, SearchSuggestion, SearchSuggestions, SellerSummary,
};
pub use order::{
    CreateOrderRequest, CreateOrderResponse, Order, OrderId, OrderList, OrderStatus,
    UpdateOrderStatusRequest,
};
pub use price::Price;

use serde::{Deserialize, Serialize};

/// Generic `{ success, message }` acknowledgement returned by mutating endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}
