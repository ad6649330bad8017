//! Cart page and the navbar badge.
//!
//! Every mutation re-fetches the cart afterwards so the badge shows the
//! server's line count; nothing is reconciled locally.

use futures::future::join_all;
use im_api_types::{Cart, CartItemId, InstrumentId, Price};
use im_client::{ApiClient, ApiError, MIN_QUANTITY_MESSAGE, Transport};
use std::time::Duration;
use tracing::warn;

use crate::catalog::login_required;
use crate::outcome::{FormOutcome, Notice, Redirect};
use crate::view::CartPage;

pub const CHECKOUT_PAGE: &str = "checkout.html";
pub const EMPTY_CART: &str = "购物车是空的";
/// Pause before the cart page reloads after being cleared.
pub const CLEARED_RELOAD_DELAY: Duration = Duration::from_millis(500);

/// What a cart mutation changed on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CartUpdate {
    pub notice: Option<Notice>,
    /// New badge value; `None` leaves the badge alone.
    pub badge: Option<usize>,
    /// Recomputed cart total, when the cart was re-fetched.
    pub total: Option<Price>,
    pub redirect: Option<Redirect>,
}

impl CartUpdate {
    fn failed(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            badge: None,
            total: None,
            redirect: None,
        }
    }

    /// A failed mutation. An expired session sends the user to login.
    fn rejected(err: &ApiError, fallback: &str) -> Self {
        if err.requires_login() {
            return Self {
                redirect: login_required().redirect().cloned(),
                ..Self::failed(Notice::error("请先登录"))
            };
        }
        Self::failed(Notice::from_error(err, fallback))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClearOutcome {
    pub removed: usize,
    pub failed: usize,
    pub update: CartUpdate,
}

pub struct CartController<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> CartController<'a, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn load(&self) -> Result<CartPage, FormOutcome> {
        match self.client.cart().await {
            Ok(cart) => Ok(CartPage::from(&cart)),
            Err(err) if err.requires_login() => Err(login_required()),
            Err(err) => {
                warn!("loading cart failed: {err:?}");
                Err(FormOutcome::failure(Notice::error("加载购物车失败，请稍后重试")))
            }
        }
    }

    /// Badge value: distinct lines in the cart, 0 when it cannot be read.
    pub async fn count(&self) -> usize {
        self.client
            .cart()
            .await
            .inspect_err(|err| warn!("refreshing cart badge failed: {err}"))
            .map(|cart| cart.line_count())
            .unwrap_or(0)
    }

    async fn refreshed(&self, notice: Option<Notice>) -> CartUpdate {
        let cart = self
            .client
            .cart()
            .await
            .inspect_err(|err| warn!("refreshing cart failed: {err}"))
            .unwrap_or_default();
        CartUpdate {
            notice,
            badge: Some(cart.line_count()),
            total: Some(cart.computed_total()),
            redirect: None,
        }
    }

    pub async fn add(&self, instrument: InstrumentId, quantity: u32) -> CartUpdate {
        match self.client.add_to_cart(instrument, quantity).await {
            Ok(_) => self.refreshed(Some(Notice::success("已添加到购物车"))).await,
            Err(err) => CartUpdate::rejected(&err, "添加失败"),
        }
    }

    pub async fn remove(&self, item: CartItemId) -> CartUpdate {
        match self.client.remove_cart_item(item).await {
            Ok(_) => self.refreshed(Some(Notice::success("已从购物车移除"))).await,
            Err(err) => CartUpdate::rejected(&err, "移除失败"),
        }
    }

    /// Set a line's quantity. Below 1 is refused before any request.
    pub async fn update_quantity(&self, item: CartItemId, quantity: i64) -> CartUpdate {
        match self.client.update_cart_item(item, quantity).await {
            Ok(_) => self.refreshed(None).await,
            Err(ApiError::Validation(_)) => CartUpdate::failed(Notice::error(MIN_QUANTITY_MESSAGE)),
            Err(err) => CartUpdate::rejected(&err, "更新失败"),
        }
    }

    /// Remove every line concurrently.
    ///
    /// Failed deletes are counted, never retried or rolled back. The success
    /// notice only appears when all deletes went through; the badge is
    /// refreshed either way.
    pub async fn clear(&self) -> ClearOutcome {
        let cart: Cart = match self.client.cart().await {
            Ok(cart) => cart,
            Err(err) => {
                warn!("reading cart before clearing failed: {err}");
                return ClearOutcome {
                    removed: 0,
                    failed: 0,
                    update: CartUpdate::failed(Notice::error("清空失败，请重试")),
                };
            }
        };
        if cart.is_empty() {
            return ClearOutcome {
                removed: 0,
                failed: 0,
                update: CartUpdate {
                    notice: None,
                    badge: Some(0),
                    total: Some(Price::default()),
                    redirect: None,
                },
            };
        }

        let deletes = cart
            .items
            .iter()
            .map(|item| self.client.remove_cart_item(item.id));
        let results = join_all(deletes).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        let removed = results.len() - failed;
        for (item, result) in cart.items.iter().zip(&results) {
            if let Err(err) = result {
                warn!(item = %item.id, "removing cart line failed: {err}");
            }
        }

        let notice = if failed == 0 {
            Notice::success("购物车已清空")
        } else {
            Notice::error(format!("{failed}件商品移除失败，请重试"))
        };
        let mut update = self.refreshed(Some(notice)).await;
        if removed > 0 {
            update.redirect = Some(Redirect::reload(CLEARED_RELOAD_DELAY));
        }

        ClearOutcome {
            removed,
            failed,
            update,
        }
    }

    pub async fn checkout(&self) -> FormOutcome {
        match self.client.cart().await {
            Ok(cart) if cart.is_empty() => FormOutcome::failure(Notice::error(EMPTY_CART)),
            Ok(_) => FormOutcome::Success {
                notice: None,
                redirect: Some(Redirect::now(CHECKOUT_PAGE)),
            },
            Err(err) if err.requires_login() => login_required(),
            Err(err) => {
                warn!("checkout failed: {err:?}");
                FormOutcome::failure(Notice::error("结算失败，请重试"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::instrument_json;
    use im_client::Method;
    use im_client::mock::{MockTransport, mock_client};

    fn cart_json(item_ids: &[i64]) -> String {
        let items: Vec<String> = item_ids
            .iter()
            .map(|id| format!(r#"{{"id":{id},"quantity":2,"instrument":{}}}"#, instrument_json(id + 100)))
            .collect();
        format!(
            r#"{{"success":true,"items":[{}],"total_price":{}}}"#,
            items.join(","),
            item_ids.len() * 1600
        )
    }

    #[tokio::test]
    async fn add_success_refreshes_the_badge() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Post, "/cart/add", 200, r#"{"success":true}"#);
        transport.reply(Method::Get, "/cart", 200, &cart_json(&[1, 2]));
        let client = mock_client(&transport);

        let update = CartController::new(&client).add(InstrumentId(42), 1).await;
        assert_eq!(update.notice, Some(Notice::success("已添加到购物车")));
        assert_eq!(update.badge, Some(2));
        assert_eq!(update.total, Some(Price(3200.0)));
        Ok(())
    }

    #[tokio::test]
    async fn add_rejection_shows_server_message_and_keeps_badge() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(
            Method::Post,
            "/cart/add",
            200,
            r#"{"success":false,"message":"out of stock"}"#,
        );
        let client = mock_client(&transport);

        let update = CartController::new(&client).add(InstrumentId(42), 1).await;
        assert_eq!(update.notice, Some(Notice::error("out of stock")));
        assert_eq!(update.badge, None);
        assert!(transport.requests_to(Method::Get, "/cart").is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn quantity_below_one_sends_nothing() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        let client = mock_client(&transport);

        let update = CartController::new(&client)
            .update_quantity(CartItemId(5), 0)
            .await;
        assert_eq!(update.notice, Some(Notice::error(MIN_QUANTITY_MESSAGE)));
        assert!(transport.requests().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn expired_session_on_line_changes_goes_to_login() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Delete, "/cart/7", 401, r#"{"message":"请先登录"}"#);
        transport.reply(Method::Put, "/cart/7", 401, r#"{"message":"请先登录"}"#);
        let client = mock_client(&transport);
        let cart = CartController::new(&client);
        let to_login = login_required().redirect().cloned();

        let removed = cart.remove(CartItemId(7)).await;
        assert_eq!(removed.notice, Some(Notice::error("请先登录")));
        assert_eq!(removed.redirect, to_login);

        let updated = cart.update_quantity(CartItemId(7), 3).await;
        assert_eq!(updated.notice, Some(Notice::error("请先登录")));
        assert_eq!(updated.redirect, to_login);
        assert!(transport.requests_to(Method::Get, "/cart").is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn clear_reports_partial_failure_and_still_refreshes() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Get, "/cart", 200, &cart_json(&[1, 2, 3]));
        transport.reply(Method::Get, "/cart", 200, &cart_json(&[2]));
        transport.reply(Method::Delete, "/cart/1", 200, r#"{"success":true}"#);
        transport.reply(Method::Delete, "/cart/2", 500, r#"{"message":"busy"}"#);
        transport.reply(Method::Delete, "/cart/3", 200, r#"{"success":true}"#);
        let client = mock_client(&transport);

        let outcome = CartController::new(&client).clear().await;
        assert_eq!((outcome.removed, outcome.failed), (2, 1));
        assert_eq!(outcome.update.notice, Some(Notice::error("1件商品移除失败，请重试")));
        assert_eq!(outcome.update.badge, Some(1));
        assert_eq!(outcome.update.redirect, Some(Redirect::reload(CLEARED_RELOAD_DELAY)));
        assert_eq!(transport.requests_to(Method::Delete, "/cart/2").len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn clear_all_succeeds() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Get, "/cart", 200, &cart_json(&[1]));
        transport.reply(Method::Get, "/cart", 200, &cart_json(&[]));
        transport.reply(Method::Delete, "/cart/1", 200, r#"{"success":true}"#);
        let client = mock_client(&transport);

        let outcome = CartController::new(&client).clear().await;
        assert_eq!(outcome.update.notice, Some(Notice::success("购物车已清空")));
        assert_eq!(outcome.update.badge, Some(0));
        Ok(())
    }

    #[tokio::test]
    async fn checkout_needs_a_non_empty_cart() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Get, "/cart", 200, &cart_json(&[]));
        transport.reply(Method::Get, "/cart", 200, &cart_json(&[4]));
        let client = mock_client(&transport);
        let cart = CartController::new(&client);

        let empty = cart.checkout().await;
        assert_eq!(empty.notice(), Some(&Notice::error(EMPTY_CART)));

        let filled = cart.checkout().await;
        assert_eq!(filled.redirect(), Some(&Redirect::now(CHECKOUT_PAGE)));
        Ok(())
    }
}
