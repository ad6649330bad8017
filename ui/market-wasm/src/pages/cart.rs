//! The cart page. Every change re-renders `#cartContainer` from the server.

use im_api_types::CartItemId;
use im_storefront::{CartController, render};

use crate::dom::{self, get_el};
use crate::events;
use crate::notify;
use crate::pages::navbar;
use crate::state::App;

pub async fn run(app: &App) -> anyhow::Result<()> {
    let container = get_el!(web_sys::Element, "cartContainer");
    bind(app, &container)?;
    render_cart(app).await;
    Ok(())
}

async fn render_cart(app: &App) {
    let Some(container) = dom::by_id("cartContainer") else {
        return;
    };
    match CartController::new(&app.client).load().await {
        Ok(page) => dom::set_html(&container, &render::cart_page(&page)),
        Err(outcome) => {
            dom::set_html(&container, &render::load_error("加载购物车失败"));
            notify::apply(app, &outcome);
        }
    }
}

fn item_id(el: &web_sys::Element) -> Option<CartItemId> {
    events::data_id(el, "data-item-id").map(CartItemId)
}

/// The container's content is replaced on every render, so listeners are
/// delegated from it.
fn bind(app: &App, container: &web_sys::Element) -> anyhow::Result<()> {
    let on_quantity = app.clone();
    events::delegate(container, ".quantity-btn", move |button, _| {
        let (Some(item), Some(quantity)) = (item_id(&button), events::data_id(&button, "data-quantity"))
        else {
            return;
        };
        let app = on_quantity.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let update = CartController::new(&app.client)
                .update_quantity(item, quantity)
                .await;
            navbar::apply_cart_update(&app, &update);
            render_cart(&app).await;
        });
    })?;

    let on_remove = app.clone();
    events::delegate(container, ".remove-item-btn", move |button, _| {
        let Some(item) = item_id(&button) else {
            return;
        };
        if !dom::confirm("确定要移除这件商品吗？") {
            return;
        }
        let app = on_remove.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let update = CartController::new(&app.client).remove(item).await;
            navbar::apply_cart_update(&app, &update);
            render_cart(&app).await;
        });
    })?;

    let on_clear = app.clone();
    events::delegate(container, "#clearCartBtn", move |_, _| {
        if !dom::confirm("确定要清空购物车吗？") {
            return;
        }
        let app = on_clear.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let cleared = CartController::new(&app.client).clear().await;
            tracing::info!(removed = cleared.removed, failed = cleared.failed, "cart cleared");
            navbar::apply_cart_update(&app, &cleared.update);
            if cleared.update.redirect.is_none() {
                render_cart(&app).await;
            }
        });
    })?;

    let on_checkout = app.clone();
    events::delegate(container, "#checkoutBtn", move |_, _| {
        let app = on_checkout.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = CartController::new(&app.client).checkout().await;
            notify::apply(&app, &outcome);
        });
    })
}
