//! Home, detail, search and publish pages.

use gloo_utils::window;
use im_api_types::{CategoryId, Condition, InstrumentId};
use im_storefront::render::{self, LOAD_FAILED, NO_RESULTS};
use im_storefront::{
    CatalogController, DetailOutcome, DetailView, FavoriteOutcome, Notice, PublishForm, SearchParams,
    parse_main_image_index,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlButtonElement, HtmlFormElement, HtmlInputElement};

use crate::dom::{self, get_el};
use crate::events::{self, on_click_async, on_submit_async};
use crate::notify::{self, Busy};
use crate::pages::navbar;
use crate::state::{self, App, DetailState};
use crate::util;

const NO_LISTINGS: &str = "暂无乐器";

// ── Home ──

pub async fn home(app: &App) -> anyhow::Result<()> {
    let page = CatalogController::new(&app.client).home().await;
    if let (Some(grid), Some(tiles)) = (dom::by_id("categoriesGrid"), &page.categories) {
        dom::set_html(&grid, &render::category_grid(tiles));
    }
    if let (Some(grid), Some(cards)) = (dom::by_id("hotInstruments"), &page.hot) {
        dom::set_html(&grid, &render::instrument_grid(cards, NO_LISTINGS));
    }
    if let (Some(grid), Some(cards)) = (dom::by_id("instrumentsGrid"), &page.latest) {
        dom::set_html(&grid, &render::instrument_grid(cards, NO_LISTINGS));
    }
    Ok(())
}

// ── Detail ──

pub async fn detail(app: &App) -> anyhow::Result<()> {
    let Some(id) = util::url_param("id").and_then(|v| v.parse().ok()).map(InstrumentId) else {
        notify::show(&Notice::error("缺少乐器ID"));
        return Ok(());
    };

    match CatalogController::new(&app.client).detail(id).await {
        DetailOutcome::Found(view) => {
            state::set_detail(DetailState {
                instrument: Some(view.id),
            });
            render_detail(&view);
            bind_detail(app)?;
            if let Some(category) = view.category_id {
                load_related(app, category, view.id).await;
            }
        }
        DetailOutcome::NotFound { notice, redirect } => {
            notify::show(&notice);
            notify::follow(app, &redirect);
        }
        DetailOutcome::Failed(notice) => notify::show(&notice),
    }
    Ok(())
}

fn render_detail(view: &DetailView) {
    dom::set_title(&view.document_title);
    dom::set_text_by_id("categoryName", &view.breadcrumb);
    if let (Some(frame), Some(image)) = (dom::by_id("mainImage"), render::main_image(view)) {
        dom::set_html(&frame, &image);
    }
    if let Some(list) = dom::by_id("thumbnailList") {
        dom::set_html(&list, &render::thumbnails(view));
    }

    dom::set_text_by_id("productTitle", &view.title);
    dom::set_text_by_id("viewCount", &view.views.to_string());
    dom::set_text_by_id("favoriteCount", &view.favorites.to_string());
    dom::set_text_by_id("currentPrice", &view.price);
    if let Some(original) = dom::by_id("originalPrice") {
        match &view.original_price {
            Some(price) => {
                dom::set_text(&original, price);
                dom::set_display(&original, "inline");
            }
            None => dom::set_display(&original, "none"),
        }
    }

    dom::set_text_by_id("descriptionContent", &view.description);
    dom::set_text_by_id("brandValue", &view.brand);
    dom::set_text_by_id("modelValue", &view.model);
    dom::set_text_by_id("conditionValue", view.condition_label);
    dom::set_text_by_id("locationValue", &view.location);
    if let Some(badge) = dom::by_id("conditionBadge") {
        dom::set_text(&badge, view.condition_label);
        badge.set_class_name(&format!("condition-badge {}", view.condition_class));
    }

    if let Some(preview) = dom::by_id("audioPreview") {
        match &view.audio_url {
            Some(url) => {
                if let Some(player) = dom::by_id("audioPlayer") {
                    let _ = player.set_attribute("src", url);
                }
                dom::set_display(&preview, "block");
            }
            None => dom::set_display(&preview, "none"),
        }
    }

    if let (Some(card), Some(seller)) = (dom::by_id("sellerCard"), &view.seller) {
        dom::set_html(&card, &render::seller_card(seller));
    }
    show_favorite(view.favorited);
}

fn show_favorite(favorited: bool) {
    if let Some(button) = dom::by_id("favoriteBtn") {
        dom::set_html(&button, render::favorite_button(favorited));
        dom::toggle_class(&button, "favorited", favorited);
    }
}

async fn load_related(app: &App, category: CategoryId, exclude: InstrumentId) {
    let Some(grid) = dom::by_id("relatedGrid") else {
        return;
    };
    match CatalogController::new(&app.client).related(category, exclude).await {
        Ok(cards) => dom::set_html(&grid, &render::related_grid(&cards)),
        Err(err) => {
            tracing::warn!("loading related instruments failed: {err}");
            dom::set_html(&grid, &render::load_error(LOAD_FAILED));
        }
    }
}

fn detail_quantity() -> u32 {
    dom::input_value("quantity")
        .parse::<u32>()
        .ok()
        .filter(|q| *q >= 1)
        .unwrap_or(1)
}

fn bind_detail(app: &App) -> anyhow::Result<()> {
    if let Some(list) = dom::by_id("thumbnailList") {
        let scope = list.clone();
        events::delegate(&list, ".thumbnail", move |thumb, _| {
            let Some(src) = thumb.get_attribute("data-src") else {
                return;
            };
            if let Some(current) = dom::by_id("currentImage") {
                let _ = current.set_attribute("src", &src);
            }
            for other in dom::query_all_within(&scope, ".thumbnail") {
                dom::remove_class(&other, "active");
            }
            dom::add_class(&thumb, "active");
        })?;
    }
    if let Some(button) = dom::by_id("favoriteBtn") {
        on_click_async!(button, app, toggle_favorite);
    }
    if let Some(button) = dom::by_id("addToCartBtn") {
        on_click_async!(button, app, add_to_cart);
    }
    if let Some(button) = dom::by_id("buyNowBtn") {
        on_click_async!(button, app, buy_now);
    }
    if let Some(button) = dom::by_id("shareBtn") {
        on_click_async!(button, app, share_link);
    }
    if let Some(card) = dom::by_id("sellerCard") {
        events::delegate(&card, ".contact-seller-btn", |_, _| contact_seller())?;
    }
    Ok(())
}

async fn toggle_favorite(app: &App) {
    let Some(id) = state::detail().instrument else {
        return;
    };
    match CatalogController::new(&app.client).toggle_favorite(id).await {
        FavoriteOutcome::Toggled {
            notice,
            favorited,
            count,
        } => {
            show_favorite(favorited);
            dom::set_text_by_id("favoriteCount", &count.to_string());
            notify::show(&notice);
        }
        FavoriteOutcome::Failed(outcome) => notify::apply(app, &outcome),
    }
}

async fn add_to_cart(app: &App) {
    if let Some(id) = state::detail().instrument {
        navbar::add_to_cart(app, id, detail_quantity()).await;
    }
}

async fn buy_now(app: &App) {
    let Some(id) = state::detail().instrument else {
        return;
    };
    let outcome = CatalogController::new(&app.client)
        .buy_now(id, detail_quantity())
        .await;
    notify::apply(app, &outcome);
}

async fn share_link(_app: &App) {
    let notice = if util::copy_to_clipboard(&dom::href()).await {
        Notice::success("链接已复制")
    } else {
        Notice::error("复制失败，请手动复制链接")
    };
    notify::show(&notice);
}

fn contact_seller() {
    let message = window()
        .prompt_with_message("请输入要发送给卖家的消息：")
        .ok()
        .flatten()
        .filter(|m| !m.trim().is_empty());
    if message.is_some() {
        let _ = window().alert_with_message("消息已发送给卖家");
    }
}

// ── Search ──

pub async fn search(app: &App) -> anyhow::Result<()> {
    let params = SearchParams::from_query(&dom::search());
    if let Some(keyword) = &params.keyword {
        dom::set_input_value("searchInput", keyword);
    }
    bind_category_filter(app, &params).await?;
    run_search(app, &params).await;
    Ok(())
}

async fn run_search(app: &App, params: &SearchParams) {
    let Some(grid) = dom::by_id("searchResults").or_else(|| dom::by_id("instrumentsGrid")) else {
        return;
    };
    match CatalogController::new(&app.client).search(params).await {
        Ok(results) => {
            dom::set_text_by_id("searchTitle", &results.heading);
            if let Some(total) = results.total {
                dom::set_text_by_id("resultCount", &total.to_string());
            }
            dom::set_html(&grid, &render::instrument_grid(&results.cards, NO_RESULTS));
        }
        Err(err) => {
            tracing::warn!("search failed: {err}");
            dom::set_html(&grid, &render::load_error(LOAD_FAILED));
        }
    }
}

/// `#categoryFilter` narrows the results in place and keeps the choice in
/// the address bar.
async fn bind_category_filter(app: &App, params: &SearchParams) -> anyhow::Result<()> {
    let Some(select) = dom::by_id("categoryFilter") else {
        return Ok(());
    };
    match CatalogController::new(&app.client).categories().await {
        Ok(tiles) => dom::set_html(
            &select,
            &format!(
                r#"<option value="">全部分类</option>{}"#,
                render::category_options(&tiles, params.category)
            ),
        ),
        Err(err) => tracing::warn!("loading categories failed: {err}"),
    }

    let app = app.clone();
    events::listen(&select, "change", move |_| {
        match dom::select_value("categoryFilter") {
            value if value.is_empty() => util::remove_url_param("category"),
            value => util::set_url_param("category", &value),
        }
        util::remove_url_param("page");
        let params = SearchParams::from_query(&dom::search());
        let app = app.clone();
        wasm_bindgen_futures::spawn_local(async move {
            run_search(&app, &params).await;
        });
    })
}

// ── Publish and edit ──

pub async fn publish(app: &App) -> anyhow::Result<()> {
    let form = get_el!(HtmlFormElement, "publishForm");
    let catalog = CatalogController::new(&app.client);

    let editing = util::url_param("edit").and_then(|v| v.parse().ok()).map(InstrumentId);
    let existing = match editing {
        Some(id) => match catalog.edit_form(id).await {
            Ok(existing) => Some(existing),
            Err(notice) => {
                notify::show(&notice);
                None
            }
        },
        None => None,
    };

    match catalog.categories().await {
        Ok(tiles) => {
            if let Some(select) = dom::by_id("category_id") {
                let selected = existing.as_ref().and_then(|e| e.category_id);
                let placeholder = r#"<option value="">请选择分类</option>"#;
                dom::set_html(
                    &select,
                    &format!("{placeholder}{}", render::category_options(&tiles, selected)),
                );
            }
        }
        Err(err) => tracing::warn!("loading categories failed: {err}"),
    }

    if let Some(existing) = &existing {
        fill_publish_form(&form, existing);
    }

    if let (Some(input), Some(preview)) = (
        dom::by_id_typed::<HtmlInputElement>("images"),
        dom::by_id("imagePreview"),
    ) {
        let source = input.clone();
        events::listen(&input, "change", move |_| {
            util::preview_images(&util::selected_files(&source), &preview);
        })?;
    }

    on_submit_async!(form, app, submit_publish);
    if let Some(button) = dom::by_id("deleteBtn") {
        on_click_async!(button, app, delete_instrument);
    }
    Ok(())
}

fn fill_publish_form(form: &HtmlFormElement, existing: &PublishForm) {
    if let Some(id) = existing.instrument_id {
        let _ = form.set_attribute("data-instrument-id", &id.to_string());
    }
    if let Some(heading) = dom::query(".page-title") {
        dom::set_text(&heading, "编辑乐器");
    }
    if let Some(button) = publish_button() {
        button.set_inner_html(r#"<i class="fas fa-save"></i> 更新乐器"#);
    }
    if let Some(button) = dom::by_id("deleteBtn") {
        dom::set_display(&button, "inline-block");
    }

    dom::set_input_value("title", &existing.title);
    dom::set_textarea_value("description", &existing.description);
    dom::set_input_value("price", &existing.price);
    dom::set_input_value("original_price", &existing.original_price);
    if let Some(category) = existing.category_id {
        dom::set_select_value("category_id", &category.to_string());
    }
    dom::set_select_value("condition", existing.condition.as_str());
    dom::set_input_value("brand", &existing.brand);
    dom::set_input_value("model", &existing.model);
    dom::set_input_value("location", &existing.location);
    if let Some(preview) = dom::by_id("imagePreview") {
        dom::set_html(&preview, &render::image_previews(&existing.existing_images));
    }
}

fn publish_button() -> Option<HtmlButtonElement> {
    dom::query("#publishForm button[type=\"submit\"]")
        .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
}

fn editing_id() -> Option<InstrumentId> {
    dom::by_id("publishForm")
        .and_then(|form| events::data_id(&form, "data-instrument-id"))
        .map(InstrumentId)
}

/// `#main_image_index` may be a text input or a select.
fn main_image_field() -> String {
    let value = dom::input_value("main_image_index");
    if value.is_empty() {
        dom::select_value("main_image_index")
    } else {
        value
    }
}

async fn read_publish_form() -> Result<PublishForm, JsValue> {
    let mut images = Vec::new();
    if let Some(input) = dom::by_id_typed::<HtmlInputElement>("images") {
        for file in util::selected_files(&input) {
            images.push(util::read_file(&file).await?);
        }
    }
    Ok(PublishForm {
        instrument_id: editing_id(),
        title: dom::input_value("title"),
        description: dom::textarea_value("description"),
        price: dom::input_value("price"),
        original_price: dom::input_value("original_price"),
        category_id: dom::select_value("category_id").parse().ok().map(CategoryId),
        condition: Condition::from(dom::select_value("condition")),
        brand: dom::input_value("brand"),
        model: dom::input_value("model"),
        location: dom::input_value("location"),
        images,
        main_image_index: parse_main_image_index(&main_image_field()),
        existing_images: Vec::new(),
    })
}

async fn submit_publish(app: &App) {
    let form = match read_publish_form().await {
        Ok(form) => form,
        Err(err) => {
            tracing::warn!("reading images failed: {err:?}");
            notify::show(&Notice::error("图片读取失败"));
            return;
        }
    };
    let working = if form.is_edit() { "更新中..." } else { "发布中..." };
    let _busy = Busy::start(publish_button(), working);
    let outcome = CatalogController::new(&app.client).publish(&form).await;
    notify::apply(app, &outcome);
}

async fn delete_instrument(app: &App) {
    let Some(id) = editing_id() else {
        return;
    };
    if !dom::confirm("确定要删除这个乐器吗？此操作不可撤销。") {
        return;
    }
    let outcome = CatalogController::new(&app.client).delete(id).await;
    notify::apply(app, &outcome);
}
