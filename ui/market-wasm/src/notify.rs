//! Toasts and scheduled navigation.

use std::time::Duration;

use gloo_timers::callback::Timeout;
use gloo_timers::future::sleep;
use gloo_utils::body;
use im_storefront::render;
use im_storefront::{FormOutcome, Navigation, Notice, Redirect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlButtonElement;

use crate::dom;
use crate::state::App;

/// How long a toast stays up.
const NOTICE_LIFETIME: Duration = Duration::from_millis(3000);

pub fn show(notice: &Notice) {
    if let Err(err) = try_show(notice) {
        tracing::warn!("showing notice failed: {err:?}");
    }
}

fn try_show(notice: &Notice) -> Result<(), JsValue> {
    let toast = dom::create_element("div")?;
    toast.set_class_name(&format!("notification {}", notice.kind.as_class()));
    dom::set_html(&toast, &render::notice(notice));
    body().append_child(&toast)?;

    if let Some(close) = toast.query_selector(".notification-close")? {
        let target = toast.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            target.remove();
        }) as Box<dyn FnMut(_)>);
        close.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    Timeout::new(NOTICE_LIFETIME.as_millis() as u32, move || toast.remove()).forget();
    Ok(())
}

/// Navigate after the redirect's delay.
pub fn follow(app: &App, redirect: &Redirect) {
    let app = app.clone();
    let redirect = redirect.clone();
    wasm_bindgen_futures::spawn_local(async move {
        if !redirect.after.is_zero() {
            sleep(redirect.after).await;
        }
        match redirect.to {
            Navigation::To(target) => dom::navigate(&target),
            Navigation::Reload => dom::reload(),
            Navigation::Logout => crate::pages::auth::logout(&app).await,
        }
    });
}

/// Show the outcome's notice, focus a rejected field and schedule its
/// redirect.
pub fn apply(app: &App, outcome: &FormOutcome) {
    if let Some(notice) = outcome.notice() {
        show(notice);
    }
    if let FormOutcome::Failure {
        field: Some(field), ..
    } = outcome
    {
        dom::focus(field);
    }
    if let Some(redirect) = outcome.redirect() {
        follow(app, redirect);
    }
}

/// Disable a submit button and swap its label while a request runs.
/// Dropping the guard restores it.
pub struct Busy {
    button: HtmlButtonElement,
    label: String,
}

impl Busy {
    pub fn start(button: Option<HtmlButtonElement>, working: &str) -> Option<Self> {
        let button = button?;
        let label = button.inner_html();
        button.set_disabled(true);
        button.set_inner_html(&format!(r#"<i class="fas fa-spinner fa-spin"></i> {working}"#));
        Some(Self { button, label })
    }
}

impl Drop for Busy {
    fn drop(&mut self) {
        self.button.set_disabled(false);
        self.button.set_inner_html(&self.label);
    }
}
