//! Per-page setup, dispatched on the file name in the location path.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod navbar;

use im_storefront::page_name;

use crate::dom;
use crate::state::App;

pub async fn run(app: &App) -> anyhow::Result<()> {
    let path = dom::pathname();
    let page = page_name(&path);
    tracing::debug!(page, "page setup");
    match page {
        "login.html" | "register.html" | "user.html" => auth::bind(app),
        "index.html" => catalog::home(app).await,
        "detail.html" => catalog::detail(app).await,
        "search.html" => catalog::search(app).await,
        "publish.html" => catalog::publish(app).await,
        "cart.html" => cart::run(app).await,
        _ => Ok(()),
    }
}
