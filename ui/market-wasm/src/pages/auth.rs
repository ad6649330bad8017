//! Login, registration and account forms.

use im_api_types::{ChangePasswordRequest, LoginRequest, ProfileUpdate, RegisterRequest};
use im_storefront::{AuthController, GuardOutcome, Notice};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlButtonElement, HtmlFormElement, HtmlInputElement};

use crate::dom::{self, get_el};
use crate::events::{self, on_submit_async};
use crate::notify::{self, Busy};
use crate::state::App;
use crate::util;

pub fn bind(app: &App) -> anyhow::Result<()> {
    bind_password_toggles()?;

    if let Some(form) = dom::by_id_typed::<HtmlFormElement>("loginForm") {
        if let Some(message) = util::url_param("message") {
            notify::show(&Notice::info(message));
        }
        on_submit_async!(form, app, submit_login);
    }
    if let Some(form) = dom::by_id_typed::<HtmlFormElement>("registerForm") {
        on_submit_async!(form, app, submit_register);
    }
    if let Some(form) = dom::by_id_typed::<HtmlFormElement>("profileForm") {
        on_submit_async!(form, app, submit_profile);
    }
    if let Some(form) = dom::by_id_typed::<HtmlFormElement>("passwordForm") {
        on_submit_async!(form, app, submit_password);
    }
    Ok(())
}

/// Run the page guard. Returns false when the page is being left for the
/// login screen.
pub async fn protect(app: &App) -> bool {
    let auth = AuthController::new(&app.client, &app.session);
    match auth.guard(&dom::pathname(), &dom::href()).await {
        GuardOutcome::Public | GuardOutcome::SignedIn(_) => true,
        GuardOutcome::LoginRequired(redirect) => {
            tracing::info!("sign-in required, leaving page");
            notify::follow(app, &redirect);
            false
        }
    }
}

pub async fn logout(app: &App) {
    let outcome = AuthController::new(&app.client, &app.session).logout().await;
    notify::apply(app, &outcome);
}

// ── Forms ──

fn submit_button(form_id: &str) -> Option<HtmlButtonElement> {
    dom::query(&format!("#{form_id} button[type=\"submit\"]"))
        .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
}

async fn submit_login(app: &App) {
    let form = LoginRequest {
        username: dom::input_value("username"),
        password: dom::raw_input_value("password"),
        remember: dom::is_checked("remember"),
    };
    let _busy = Busy::start(dom::by_id_typed("loginBtn"), "登录中...");
    let outcome = AuthController::new(&app.client, &app.session).login(&form).await;
    notify::apply(app, &outcome);
}

async fn submit_register(app: &App) {
    let form = RegisterRequest {
        username: dom::input_value("username"),
        email: dom::input_value("email"),
        password: dom::raw_input_value("password"),
        confirm_password: dom::raw_input_value("confirm_password"),
        phone: dom::input_value("phone"),
        real_name: dom::input_value("real_name"),
        student_id: dom::input_value("student_id"),
        school: dom::input_value("school"),
    };
    let _busy = Busy::start(dom::by_id_typed("registerBtn"), "注册中...");
    let outcome = AuthController::new(&app.client, &app.session)
        .register(&form)
        .await;
    notify::apply(app, &outcome);
}

fn optional(id: &str) -> Option<String> {
    Some(dom::input_value(id)).filter(|v| !v.is_empty())
}

async fn submit_profile(app: &App) {
    let update = ProfileUpdate {
        real_name: optional("real_name"),
        phone: optional("phone"),
        student_id: optional("student_id"),
    };
    let avatar = match dom::by_id_typed::<HtmlInputElement>("avatar")
        .and_then(|input| util::selected_files(&input).into_iter().next())
    {
        Some(file) => match util::read_file(&file).await {
            Ok(part) => Some(part),
            Err(err) => {
                tracing::warn!("reading avatar failed: {err:?}");
                notify::show(&Notice::error("头像读取失败"));
                return;
            }
        },
        None => None,
    };

    let _busy = Busy::start(submit_button("profileForm"), "保存中...");
    let outcome = AuthController::new(&app.client, &app.session)
        .update_profile(&update, avatar)
        .await;
    notify::apply(app, &outcome);
}

async fn submit_password(app: &App) {
    let form = ChangePasswordRequest {
        old_password: dom::raw_input_value("old_password"),
        new_password: dom::raw_input_value("new_password"),
        confirm_password: dom::raw_input_value("confirm_password"),
    };
    let _busy = Busy::start(submit_button("passwordForm"), "提交中...");
    let outcome = AuthController::new(&app.client, &app.session)
        .change_password(&form)
        .await;
    notify::apply(app, &outcome);
    if outcome.is_success() {
        if let Some(form) = dom::by_id_typed::<HtmlFormElement>("passwordForm") {
            form.reset();
        }
    }
}

// ── Password visibility ──

fn flip_visibility(input: &HtmlInputElement, icon: Option<web_sys::Element>) {
    let reveal = input.type_() == "password";
    input.set_type(if reveal { "text" } else { "password" });
    if let Some(icon) = icon {
        dom::toggle_class(&icon, "fa-eye", !reveal);
        dom::toggle_class(&icon, "fa-eye-slash", reveal);
    }
}

/// `.toggle-password` buttons sit next to their input; `#togglePassword`
/// belongs to `#password`.
fn bind_password_toggles() -> anyhow::Result<()> {
    for toggle in dom::query_all(".toggle-password") {
        let button = toggle.clone();
        events::listen(&toggle, "click", move |_| {
            let input = button
                .parent_element()
                .and_then(|parent| parent.query_selector("input").ok().flatten())
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
            if let Some(input) = input {
                flip_visibility(&input, button.query_selector("i").ok().flatten());
            }
        })?;
    }

    if let Some(toggle) = dom::by_id("togglePassword") {
        let input = get_el!(HtmlInputElement, "password");
        let button = toggle.clone();
        events::listen(&toggle, "click", move |_| {
            flip_visibility(&input, button.query_selector("i").ok().flatten());
        })?;
    }
    Ok(())
}
