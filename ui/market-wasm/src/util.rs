//! Browser helpers shared by the pages.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Timeout;
use gloo_utils::{document, window};
use im_client::FilePart;
use im_storefront::render;
use js_sys::{Function, Promise, Reflect, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, File, HtmlInputElement, ScrollBehavior, ScrollToOptions, Url, UrlSearchParams};

use crate::dom;

fn millis(wait: Duration) -> u32 {
    u32::try_from(wait.as_millis()).unwrap_or(u32::MAX)
}

// ── Timing ──

/// Run `f` once calls have stopped for `wait`.
pub fn debounce<A: 'static>(wait: Duration, f: impl Fn(A) + 'static) -> impl Fn(A) {
    let f = Rc::new(f);
    let pending: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));
    move |arg: A| {
        let f = f.clone();
        // Replacing the handle drops (and cancels) the previous timer.
        *pending.borrow_mut() = Some(Timeout::new(millis(wait), move || (*f)(arg)));
    }
}

/// Run `f` at most once per `limit`; calls inside the window are dropped.
pub fn throttle<A: 'static>(limit: Duration, f: impl Fn(A) + 'static) -> impl Fn(A) {
    let closed = Rc::new(Cell::new(false));
    move |arg: A| {
        if closed.get() {
            return;
        }
        f(arg);
        closed.set(true);
        let reopen = closed.clone();
        Timeout::new(millis(limit), move || reopen.set(false)).forget();
    }
}

// ── Clipboard ──

/// Write `text` to the clipboard. Failures are logged and reported as false.
pub async fn copy_to_clipboard(text: &str) -> bool {
    match write_clipboard(text).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!("clipboard write failed: {err:?}");
            false
        }
    }
}

async fn write_clipboard(text: &str) -> Result<(), JsValue> {
    let clipboard = Reflect::get(&window().navigator(), &"clipboard".into())?;
    let write: Function = Reflect::get(&clipboard, &"writeText".into())?.dyn_into()?;
    let promise: Promise = write.call1(&clipboard, &text.into())?.dyn_into()?;
    JsFuture::from(promise).await?;
    Ok(())
}

// ── Viewport ──

pub fn is_in_viewport(el: &Element) -> bool {
    let rect = el.get_bounding_client_rect();
    let root = document().document_element();
    let height = window()
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .or_else(|| root.as_ref().map(|r| f64::from(r.client_height())))
        .unwrap_or(0.0);
    let width = window()
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .or_else(|| root.as_ref().map(|r| f64::from(r.client_width())))
        .unwrap_or(0.0);
    rect.top() >= 0.0 && rect.left() >= 0.0 && rect.bottom() <= height && rect.right() <= width
}

/// Smooth-scroll so `el` sits `offset` pixels below the top of the viewport.
pub fn scroll_to_element(el: &Element, offset: f64) {
    let top = el.get_bounding_client_rect().top() + window().scroll_y().unwrap_or(0.0) - offset;
    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    window().scroll_to_with_scroll_to_options(&options);
}

// ── URL parameters ──

pub fn url_param(name: &str) -> Option<String> {
    UrlSearchParams::new_with_str(&dom::search())
        .ok()?
        .get(name)
        .filter(|v| !v.is_empty())
}

pub fn set_url_param(name: &str, value: &str) {
    rewrite_url(|url| url.search_params().set(name, value));
}

pub fn remove_url_param(name: &str) {
    rewrite_url(|url| url.search_params().delete(name));
}

/// Edit the current URL and push it onto history without navigating.
fn rewrite_url(edit: impl FnOnce(&Url)) {
    let Ok(url) = Url::new(&dom::href()) else {
        return;
    };
    edit(&url);
    let pushed = window()
        .history()
        .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(&url.href())));
    if let Err(err) = pushed {
        tracing::warn!("history update failed: {err:?}");
    }
}

// ── Files ──

pub fn selected_files(input: &HtmlInputElement) -> Vec<File> {
    let Some(list) = input.files() else {
        return Vec::new();
    };
    (0..list.length()).filter_map(|i| list.get(i)).collect()
}

pub async fn read_file(file: &File) -> Result<FilePart, JsValue> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    Ok(FilePart {
        file_name: file.name(),
        content_type: file.type_(),
        bytes: Uint8Array::new(&buffer).to_vec(),
    })
}

/// Render object-URL previews of the chosen images into `container`.
/// Non-image files are skipped.
pub fn preview_images(files: &[File], container: &Element) {
    let urls: Vec<String> = files
        .iter()
        .filter(|file| file.type_().starts_with("image/"))
        .filter_map(|file| Url::create_object_url_with_blob(file).ok())
        .collect();
    dom::set_html(container, &render::image_previews(&urls));
}
