//! Listener plumbing.
//!
//! Closures are leaked with `forget()`: pages never unbind, and the
//! listeners live as long as the document.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, EventTarget};

use crate::dom::js_err;

/// Attach an async click handler taking the page context.
macro_rules! on_click_async {
    ($el:expr, $app:expr, $handler:expr) => {{
        let app = $app.clone();
        let cb = Closure::wrap(Box::new(move |event: web_sys::MouseEvent| {
            event.prevent_default();
            let app2 = app.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&app2).await;
            });
        }) as Box<dyn FnMut(_)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())
            .map_err($crate::dom::js_err)?;
        cb.forget();
    }};
}
pub(crate) use on_click_async;

/// Attach a sync click handler.
macro_rules! on_click {
    ($el:expr, $cb:expr) => {{
        let cb = Closure::wrap(Box::new($cb) as Box<dyn FnMut(web_sys::MouseEvent)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())
            .map_err($crate::dom::js_err)?;
        cb.forget();
    }};
}
pub(crate) use on_click;

/// Intercept a form's submit and run an async handler instead.
macro_rules! on_submit_async {
    ($form:expr, $app:expr, $handler:expr) => {{
        let app = $app.clone();
        let cb = Closure::wrap(Box::new(move |event: web_sys::Event| {
            event.prevent_default();
            let app2 = app.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&app2).await;
            });
        }) as Box<dyn FnMut(_)>);
        $form
            .add_event_listener_with_callback("submit", cb.as_ref().unchecked_ref())
            .map_err($crate::dom::js_err)?;
        cb.forget();
    }};
}
pub(crate) use on_submit_async;

pub fn listen(
    target: &EventTarget,
    kind: &str,
    handler: impl FnMut(Event) + 'static,
) -> anyhow::Result<()> {
    let cb = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target
        .add_event_listener_with_callback(kind, cb.as_ref().unchecked_ref())
        .map_err(js_err)?;
    cb.forget();
    Ok(())
}

/// Click delegation: `handler` gets the closest ancestor of the click
/// target matching `selector`, if it lies inside `container`.
pub fn delegate(
    container: &Element,
    selector: &'static str,
    mut handler: impl FnMut(Element, Event) + 'static,
) -> anyhow::Result<()> {
    let scope = container.clone();
    listen(container, "click", move |event: Event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Ok(Some(matched)) = target.closest(selector) else {
            return;
        };
        if scope.contains(Some(matched.as_ref())) {
            handler(matched, event);
        }
    })
}

/// `data-*` attribute as a number.
pub fn data_id(el: &Element, name: &str) -> Option<i64> {
    el.get_attribute(name)?.trim().parse().ok()
}
