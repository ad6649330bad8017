//! DOM helpers.
//!
//! Lookups return `Option`: most pages only carry a subset of the elements
//! and the scripts skip whatever is absent. Page modules bind the elements
//! they require with [`get_el!`], which turns a missing id into an error.

use anyhow::anyhow;
use gloo_utils::{document, window};
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

// ── Errors ──

/// Render a thrown JS value as an error.
pub fn js_err(value: JsValue) -> anyhow::Error {
    match value.as_string() {
        Some(text) => anyhow!(text),
        None => anyhow!("{value:?}"),
    }
}

// ── Lookup ──

pub fn by_id(id: &str) -> Option<Element> {
    document().get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn query(selector: &str) -> Option<Element> {
    document().query_selector(selector).ok()?
}

pub fn query_all(selector: &str) -> Vec<Element> {
    collect(document().query_selector_all(selector).ok())
}

pub fn query_all_within(parent: &Element, selector: &str) -> Vec<Element> {
    collect(parent.query_selector_all(selector).ok())
}

fn collect(list: Option<web_sys::NodeList>) -> Vec<Element> {
    let Some(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Bind a required element by id, failing the page setup if it is missing.
macro_rules! get_el {
    ($ty:ty, $id:expr) => {
        $crate::dom::by_id_typed::<$ty>($id)
            .ok_or_else(|| anyhow::anyhow!("missing element #{}", $id))?
    };
}
pub(crate) use get_el;

// ── Content ──

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn set_text_by_id(id: &str, text: &str) {
    if let Some(el) = by_id(id) {
        set_text(&el, text);
    }
}

pub fn set_html(el: &Element, html: &str) {
    el.set_inner_html(html);
}

pub fn set_title(title: &str) {
    document().set_title(title);
}

pub fn input_value(id: &str) -> String {
    by_id_typed::<HtmlInputElement>(id)
        .map(|el| el.value().trim().to_string())
        .unwrap_or_default()
}

/// Password fields keep their whitespace.
pub fn raw_input_value(id: &str) -> String {
    by_id_typed::<HtmlInputElement>(id)
        .map(|el| el.value())
        .unwrap_or_default()
}

pub fn set_input_value(id: &str, value: &str) {
    if let Some(el) = by_id_typed::<HtmlInputElement>(id) {
        el.set_value(value);
    }
}

pub fn is_checked(id: &str) -> bool {
    by_id_typed::<HtmlInputElement>(id).is_some_and(|el| el.checked())
}

pub fn select_value(id: &str) -> String {
    by_id_typed::<HtmlSelectElement>(id)
        .map(|el| el.value())
        .unwrap_or_default()
}

pub fn set_select_value(id: &str, value: &str) {
    if let Some(el) = by_id_typed::<HtmlSelectElement>(id) {
        el.set_value(value);
    }
}

pub fn textarea_value(id: &str) -> String {
    by_id_typed::<HtmlTextAreaElement>(id)
        .map(|el| el.value().trim().to_string())
        .unwrap_or_default()
}

pub fn set_textarea_value(id: &str, value: &str) {
    if let Some(el) = by_id_typed::<HtmlTextAreaElement>(id) {
        el.set_value(value);
    }
}

pub fn focus(id: &str) {
    if let Some(el) = by_id_typed::<HtmlElement>(id) {
        let _ = el.focus();
    }
}

// ── Classes and visibility ──

pub fn add_class(el: &Element, cls: &str) {
    let _ = el.class_list().add_1(cls);
}

pub fn remove_class(el: &Element, cls: &str) {
    let _ = el.class_list().remove_1(cls);
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn set_display(el: &Element, value: &str) {
    if let Some(html) = el.dyn_ref::<HtmlElement>() {
        let _ = html.style().set_property("display", value);
    }
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    document().create_element(tag)
}

// ── Location ──

pub fn pathname() -> String {
    window().location().pathname().unwrap_or_default()
}

pub fn href() -> String {
    window().location().href().unwrap_or_default()
}

pub fn search() -> String {
    window().location().search().unwrap_or_default()
}

pub fn navigate(target: &str) {
    if let Err(err) = window().location().set_href(target) {
        tracing::warn!("navigation to {target} failed: {err:?}");
    }
}

pub fn reload() {
    if let Err(err) = window().location().reload() {
        tracing::warn!("reload failed: {err:?}");
    }
}

pub fn confirm(message: &str) -> bool {
    window().confirm_with_message(message).unwrap_or(false)
}
