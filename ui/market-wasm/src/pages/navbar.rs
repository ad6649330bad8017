//! Header and site-wide bindings present on every page: auth state, user
//! menu, search box, cart badge, card links, scrolling and images.

use std::time::Duration;

use gloo_utils::{body, document, window};
use im_api_types::InstrumentId;
use im_storefront::format::format_price;
use im_storefront::{
    AuthController, CartController, CartUpdate, CatalogController, NavbarState, render, search_href,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Event, HtmlImageElement, HtmlInputElement, KeyboardEvent};

use crate::dom::{self, js_err};
use crate::events::{self, on_click, on_click_async};
use crate::notify;
use crate::state::App;
use crate::util;

const SUGGEST_DELAY: Duration = Duration::from_millis(300);
const SCROLL_INTERVAL: Duration = Duration::from_millis(100);
/// Scroll depth past which the back-to-top button shows.
const BACK_TO_TOP_AFTER: f64 = 300.0;

pub fn bind(app: &App) -> anyhow::Result<()> {
    bind_user_menu(app)?;
    bind_search(app)?;
    bind_add_to_cart(app)?;
    bind_card_links()?;
    bind_image_fallback()?;
    bind_scroll()?;

    let app2 = app.clone();
    wasm_bindgen_futures::spawn_local(async move {
        sync_auth(&app2).await;
        refresh_badge(&app2).await;
    });
    Ok(())
}

// ── Auth state ──

pub async fn sync_auth(app: &App) {
    let state = AuthController::new(&app.client, &app.session).sync_navbar().await;
    let auth_buttons = dom::by_id("authButtons");
    let user_menu = dom::by_id("userMenu");
    let user_btn = dom::by_id("userBtn");
    match state {
        NavbarState::SignedIn { username } => {
            if let Some(el) = &auth_buttons {
                dom::set_display(el, "none");
            }
            if let Some(el) = &user_menu {
                dom::set_display(el, "block");
            }
            if let Some(el) = &user_btn {
                dom::set_display(el, "flex");
            }
            if let Some(label) = dom::query("#username:not(input)") {
                dom::set_text(&label, &username);
            }
        }
        NavbarState::SignedOut => {
            if let Some(el) = &auth_buttons {
                dom::set_display(el, "flex");
            }
            if let Some(el) = &user_btn {
                dom::set_display(el, "none");
            }
        }
        NavbarState::Unchanged => {}
    }
}

fn bind_user_menu(app: &App) -> anyhow::Result<()> {
    if let Some(logout_btn) = dom::by_id("logoutBtn") {
        on_click_async!(logout_btn, app, crate::pages::auth::logout);
    }

    let (Some(user_btn), Some(menu)) = (dom::by_id("userBtn"), dom::by_id("userMenu")) else {
        return Ok(());
    };
    let toggled = menu.clone();
    on_click!(user_btn, move |event: web_sys::MouseEvent| {
        event.stop_propagation();
        let _ = toggled.class_list().toggle("show");
    });
    events::listen(&document(), "click", move |_: Event| dom::remove_class(&menu, "show"))
}

// ── Search ──

fn go_to_search() {
    if let Some(target) = search_href(&dom::input_value("searchInput")) {
        dom::navigate(&target);
    }
}

fn bind_search(app: &App) -> anyhow::Result<()> {
    let Some(input) = dom::by_id_typed::<HtmlInputElement>("searchInput") else {
        return Ok(());
    };
    if let Some(button) = dom::by_id("searchBtn") {
        on_click!(button, move |_: web_sys::MouseEvent| go_to_search());
    }
    events::listen(&input, "keypress", |event: Event| {
        if event.dyn_ref::<KeyboardEvent>().is_some_and(|key| key.key() == "Enter") {
            go_to_search();
        }
    })?;

    let Some(list) = dom::by_id("searchSuggestions") else {
        return Ok(());
    };
    let app = app.clone();
    let suggest = util::debounce(SUGGEST_DELAY, move |prefix: String| {
        let app = app.clone();
        let list = list.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let items = CatalogController::new(&app.client).suggestions(&prefix).await;
            dom::set_html(&list, &render::suggestions(&items));
            dom::set_display(&list, if items.is_empty() { "none" } else { "block" });
        });
    });
    let source = input.clone();
    events::listen(&input, "input", move |_: Event| suggest(source.value()))
}

// ── Cart ──

pub async fn refresh_badge(app: &App) {
    if dom::query(".cart-count").is_none() {
        return;
    }
    let count = CartController::new(&app.client).count().await;
    set_badge(count);
}

fn set_badge(count: usize) {
    for badge in dom::query_all(".cart-count") {
        dom::set_text(&badge, &count.to_string());
    }
}

/// Apply a cart mutation's effects to whatever the page shows.
pub fn apply_cart_update(app: &App, update: &CartUpdate) {
    if let Some(notice) = &update.notice {
        notify::show(notice);
    }
    if let Some(count) = update.badge {
        set_badge(count);
    }
    if let Some(total) = update.total {
        for el in dom::query_all(".total-price") {
            dom::set_text(&el, &format_price(total));
        }
    }
    if let Some(redirect) = &update.redirect {
        notify::follow(app, redirect);
    }
}

pub async fn add_to_cart(app: &App, instrument: InstrumentId, quantity: u32) {
    let update = CartController::new(&app.client).add(instrument, quantity).await;
    apply_cart_update(app, &update);
}

/// `.add-to-cart-btn[data-instrument-id]` anywhere on the page.
fn bind_add_to_cart(app: &App) -> anyhow::Result<()> {
    let app = app.clone();
    events::delegate(&body(), ".add-to-cart-btn", move |button, event| {
        event.prevent_default();
        let Some(id) = events::data_id(&button, "data-instrument-id") else {
            return;
        };
        let quantity = events::data_id(&button, "data-quantity")
            .and_then(|q| u32::try_from(q).ok())
            .filter(|q| *q >= 1)
            .unwrap_or(1);
        let app = app.clone();
        wasm_bindgen_futures::spawn_local(async move {
            add_to_cart(&app, InstrumentId(id), quantity).await;
        });
    })
}

// ── Cards ──

fn bind_card_links() -> anyhow::Result<()> {
    events::delegate(&body(), "[data-href]", |el, _| {
        if let Some(target) = el.get_attribute("data-href") {
            dom::navigate(&target);
        }
    })
}

/// Image `error` events do not bubble, so this listens in the capture phase.
fn bind_image_fallback() -> anyhow::Result<()> {
    let cb = Closure::wrap(Box::new(move |event: Event| {
        let Some(img) = event.target().and_then(|t| t.dyn_into::<HtmlImageElement>().ok()) else {
            return;
        };
        let Some(fallback) = img.get_attribute("data-fallback") else {
            return;
        };
        if !img.src().ends_with(&fallback) {
            img.set_src(&fallback);
        }
    }) as Box<dyn FnMut(_)>);
    let opts = AddEventListenerOptions::new();
    opts.set_capture(true);
    document()
        .add_event_listener_with_callback_and_add_event_listener_options(
            "error",
            cb.as_ref().unchecked_ref(),
            &opts,
        )
        .map_err(js_err)?;
    cb.forget();
    Ok(())
}

// ── Scrolling ──

/// `img[data-lazy]` gets its real source once it scrolls into view.
fn reveal_lazy_images() {
    for img in dom::query_all("img[data-lazy]") {
        if !util::is_in_viewport(&img) {
            continue;
        }
        if let Some(src) = img.get_attribute("data-lazy") {
            let _ = img.set_attribute("src", &src);
            let _ = img.remove_attribute("data-lazy");
        }
    }
}

fn bind_scroll() -> anyhow::Result<()> {
    reveal_lazy_images();
    let back_to_top = dom::by_id("backToTop");
    if let (Some(button), Some(root)) = (&back_to_top, document().document_element()) {
        on_click!(button, move |_: web_sys::MouseEvent| util::scroll_to_element(&root, 0.0));
    }

    let on_scroll = util::throttle(SCROLL_INTERVAL, move |_: ()| {
        reveal_lazy_images();
        if let Some(button) = &back_to_top {
            let depth = window().scroll_y().unwrap_or(0.0);
            dom::toggle_class(button, "show", depth > BACK_TO_TOP_AFTER);
        }
    });
    events::listen(&window(), "scroll", move |_: Event| on_scroll(()))
}
