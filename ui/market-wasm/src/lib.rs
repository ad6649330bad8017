//! Browser front end for the campus instrument market.
//!
//! One module serves every page: start-up binds the shared header, runs the
//! sign-in guard and then the setup for whichever page is loaded.

pub mod dom;
pub mod events;
pub mod fetch;
pub mod logging;
pub mod notify;
pub mod pages;
pub mod state;
pub mod storage;
pub mod util;

use wasm_bindgen::prelude::*;

/// WASM entry point, called when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(err) = logging::init() {
        gloo_console::warn!(err.to_string());
    }

    init().await.map_err(|err| JsValue::from_str(&format!("{err:#}")))
}

async fn init() -> anyhow::Result<()> {
    let app = state::App::load();
    pages::navbar::bind(&app)?;

    if !pages::auth::protect(&app).await {
        return Ok(());
    }
    pages::run(&app).await
}
