//! Home, detail, search and publish pages.

use im_api_types::{
    CategoryId, Condition, CreateOrderRequest, Instrument, InstrumentId, Price, SearchSuggestion,
};
use im_client::{
    ApiClient, ApiError, FilePart, InstrumentQuery, LONG_REDIRECT_DELAY, MultipartForm,
    NOT_FOUND_REDIRECT_DELAY, Transport,
};
use tracing::warn;
use url::form_urlencoded;

use crate::auth::LOGIN_PAGE;
use crate::outcome::{FormOutcome, Notice, Redirect};
use crate::view::{CategoryTile, DetailView, InstrumentCard};

pub const HOT_LIMIT: u32 = 6;
pub const LATEST_PAGE_SIZE: u32 = 12;
pub const RELATED_LIMIT: usize = 4;
pub const SEARCH_PAGE_SIZE: u32 = 20;
pub const HOME_PAGE: &str = "index.html";

/// A failed call that means "sign in first": toast, then the login page.
pub fn login_required() -> FormOutcome {
    FormOutcome::Failure {
        notice: Notice::error("请先登录"),
        field: None,
        redirect: Some(Redirect::to(LOGIN_PAGE, LONG_REDIRECT_DELAY)),
    }
}

fn action_failure(err: &ApiError, fallback: &str) -> FormOutcome {
    if err.requires_login() {
        login_required()
    } else {
        FormOutcome::failure(Notice::from_error(err, fallback))
    }
}

/// Home page sections. `None` marks a section whose fetch failed; the page
/// leaves its placeholder untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomePage {
    pub categories: Option<Vec<CategoryTile>>,
    pub hot: Option<Vec<InstrumentCard>>,
    pub latest: Option<Vec<InstrumentCard>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    Found(DetailView),
    NotFound { notice: Notice, redirect: Redirect },
    Failed(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteOutcome {
    Toggled {
        notice: Notice,
        favorited: bool,
        count: u32,
    },
    Failed(FormOutcome),
}

/// `search.html` parameters: `?q=<keyword>` or `?category=<id>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub keyword: Option<String>,
    pub category: Option<CategoryId>,
    pub page: Option<u32>,
}

impl SearchParams {
    /// Parse a query string, with or without the leading `?`.
    pub fn from_query(query: &str) -> Self {
        let mut params = SearchParams::default();
        let query = query.strip_prefix('?').unwrap_or(query);
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "q" => {
                    params.keyword = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                }
                "category" => params.category = value.parse().ok().map(CategoryId),
                "page" => params.page = value.parse().ok(),
                _ => {}
            }
        }
        params
    }
}

/// Navigation target for the header search box. Blank input goes nowhere.
pub fn search_href(keyword: &str) -> Option<String> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return None;
    }
    let encoded: String = form_urlencoded::byte_serialize(keyword.as_bytes()).collect();
    Some(format!("search.html?q={encoded}"))
}

/// Reads the main-image field like `parseInt`: leading digits count, anything
/// else is `0`.
pub fn parse_main_image_index(raw: &str) -> u32 {
    let raw = raw.trim();
    let digits = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    raw[..digits].parse().unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub heading: String,
    pub cards: Vec<InstrumentCard>,
    pub total: Option<u32>,
}

/// The publish/edit form. Edit mode is `instrument_id: Some(_)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishForm {
    pub instrument_id: Option<InstrumentId>,
    pub title: String,
    pub description: String,
    /// Raw price input.
    pub price: String,
    pub original_price: String,
    pub category_id: Option<CategoryId>,
    pub condition: Condition,
    pub brand: String,
    pub model: String,
    pub location: String,
    pub images: Vec<FilePart>,
    pub main_image_index: u32,
    /// Already-uploaded image URLs, shown as previews when editing.
    pub existing_images: Vec<String>,
}

impl PublishForm {
    pub fn from_instrument(instrument: &Instrument) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            instrument_id: Some(instrument.id),
            title: instrument.title.clone(),
            description: text(&instrument.description),
            price: instrument.price.amount().to_string(),
            original_price: instrument
                .original_price
                .map(|p| p.amount().to_string())
                .unwrap_or_default(),
            category_id: instrument.category_id,
            condition: instrument.condition.clone(),
            brand: text(&instrument.brand),
            model: text(&instrument.model),
            location: text(&instrument.location),
            images: Vec::new(),
            main_image_index: 0,
            existing_images: instrument
                .images
                .iter()
                .map(|img| img.full_url.clone())
                .collect(),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.instrument_id.is_some()
    }

    pub fn validate(&self) -> Result<(), (&'static str, &'static str)> {
        if self.title.trim().is_empty() {
            return Err(("title", "请输入乐器标题"));
        }
        if Price::parse(&self.price).amount() <= 0.0 {
            return Err(("price", "请输入有效的价格"));
        }
        if self.category_id.is_none() {
            return Err(("category_id", "请选择乐器分类"));
        }
        Ok(())
    }

    /// Scalar fields, then one `images` part per file.
    pub fn to_multipart(&self) -> MultipartForm {
        let mut form = MultipartForm::new()
            .text("title", self.title.trim())
            .text("description", self.description.trim())
            .text("price", self.price.trim());
        if !self.original_price.trim().is_empty() {
            form = form.text("original_price", self.original_price.trim());
        }
        if let Some(category) = self.category_id {
            form = form.text("category_id", category.to_string());
        }
        form = form
            .text("condition", self.condition.as_str())
            .text("brand", self.brand.trim())
            .text("model", self.model.trim())
            .text("location", self.location.trim())
            .text("main_image_index", self.main_image_index.to_string());
        for image in &self.images {
            form = form.file("images", image.clone());
        }
        form
    }
}

fn cards(instruments: &[Instrument]) -> Vec<InstrumentCard> {
    instruments.iter().map(InstrumentCard::from).collect()
}

pub struct CatalogController<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> CatalogController<'a, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn home(&self) -> HomePage {
        let categories = self
            .categories()
            .await
            .inspect_err(|err| warn!("loading categories failed: {err}"))
            .ok();
        let hot = self
            .client
            .hot_instruments(HOT_LIMIT)
            .await
            .inspect_err(|err| warn!("loading hot instruments failed: {err}"))
            .ok()
            .map(|list| cards(&list.instruments));
        let latest = self
            .client
            .instruments(&InstrumentQuery::page_size(LATEST_PAGE_SIZE))
            .await
            .inspect_err(|err| warn!("loading latest instruments failed: {err}"))
            .ok()
            .map(|list| cards(&list.instruments));

        HomePage {
            categories,
            hot,
            latest,
        }
    }

    pub async fn categories(&self) -> Result<Vec<CategoryTile>, ApiError> {
        let categories = self.client.categories().await?;
        Ok(categories.iter().map(CategoryTile::from).collect())
    }

    pub async fn detail(&self, id: InstrumentId) -> DetailOutcome {
        match self.client.instrument(id).await {
            Ok(instrument) => DetailOutcome::Found(DetailView::from(&instrument)),
            Err(ApiError::Status { status: 404, .. } | ApiError::Rejected { .. }) => {
                DetailOutcome::NotFound {
                    notice: Notice::error("乐器不存在或已被下架"),
                    redirect: Redirect::to(HOME_PAGE, NOT_FOUND_REDIRECT_DELAY),
                }
            }
            Err(err) => {
                warn!(%id, "loading instrument failed: {err:?}");
                DetailOutcome::Failed(Notice::error("加载失败，请稍后重试"))
            }
        }
    }

    /// Same-category listings other than `exclude`, at most four.
    pub async fn related(
        &self,
        category: CategoryId,
        exclude: InstrumentId,
    ) -> Result<Vec<InstrumentCard>, ApiError> {
        let query = InstrumentQuery::in_category(category, RELATED_LIMIT as u32);
        let list = self.client.instruments(&query).await?;
        Ok(list
            .instruments
            .iter()
            .filter(|instrument| instrument.id != exclude)
            .take(RELATED_LIMIT)
            .map(InstrumentCard::from)
            .collect())
    }

    /// `POST /instruments/:id/favorite` flips the state server-side; the
    /// reply's `is_favorited` is the new state.
    pub async fn toggle_favorite(&self, id: InstrumentId) -> FavoriteOutcome {
        match self.client.favorite(id).await {
            Ok(toggle) => {
                let fallback = if toggle.is_favorited { "已收藏" } else { "已取消收藏" };
                FavoriteOutcome::Toggled {
                    notice: Notice::success(toggle.message.unwrap_or_else(|| fallback.into())),
                    favorited: toggle.is_favorited,
                    count: toggle.favorite_count,
                }
            }
            Err(err) => FavoriteOutcome::Failed(action_failure(&err, "操作失败")),
        }
    }

    /// Create an order for one listing and go to its page.
    pub async fn buy_now(&self, id: InstrumentId, quantity: u32) -> FormOutcome {
        let order = CreateOrderRequest {
            instrument_id: id,
            quantity: quantity.max(1),
            meeting_time: None,
            meeting_place: None,
        };
        match self.client.create_order(&order).await {
            Ok(created) => FormOutcome::success(
                Notice::success("订单创建成功"),
                Redirect::to(
                    format!("order.html?order_id={}", created.order_id),
                    LONG_REDIRECT_DELAY,
                ),
            ),
            Err(err) => action_failure(&err, "购买失败"),
        }
    }

    pub async fn search(&self, params: &SearchParams) -> Result<SearchResults, ApiError> {
        let filters = InstrumentQuery {
            page: params.page,
            page_size: Some(SEARCH_PAGE_SIZE),
            category_id: params.category,
            ..InstrumentQuery::default()
        };

        let (heading, list) = match &params.keyword {
            Some(keyword) => (
                format!("“{keyword}”的搜索结果"),
                self.client.search(keyword, &filters).await?,
            ),
            None => ("全部乐器".to_string(), self.client.instruments(&filters).await?),
        };

        Ok(SearchResults {
            heading,
            cards: cards(&list.instruments),
            total: list.pagination.map(|p| p.total),
        })
    }

    /// Type-ahead suggestions. A blank prefix sends nothing.
    pub async fn suggestions(&self, prefix: &str) -> Vec<SearchSuggestion> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Vec::new();
        }
        self.client
            .search_suggestions(prefix)
            .await
            .inspect_err(|err| warn!("suggestions failed: {err}"))
            .unwrap_or_default()
    }

    pub async fn edit_form(&self, id: InstrumentId) -> Result<PublishForm, Notice> {
        self.client
            .instrument(id)
            .await
            .map(|instrument| PublishForm::from_instrument(&instrument))
            .map_err(|err| {
                warn!(%id, "loading instrument for edit failed: {err:?}");
                Notice::error("加载失败")
            })
    }

    /// Create or update depending on the form's mode.
    pub async fn publish(&self, form: &PublishForm) -> FormOutcome {
        if let Err((field, message)) = form.validate() {
            return FormOutcome::invalid(field, message);
        }

        let body = form.to_multipart();
        match form.instrument_id {
            Some(id) => match self.client.update_instrument(id, body).await {
                Ok(_) => FormOutcome::success(
                    Notice::success("乐器信息更新成功！"),
                    Redirect::to(format!("detail.html?id={id}"), LONG_REDIRECT_DELAY),
                ),
                Err(err) if err.is_transient() => {
                    FormOutcome::failure(Notice::error("更新失败，请检查网络"))
                }
                Err(err) => action_failure(&err, "更新失败"),
            },
            None => match self.client.publish_instrument(body).await {
                Ok(published) => {
                    let target = published
                        .instrument_id
                        .map(|id| format!("detail.html?id={id}"))
                        .unwrap_or_else(|| crate::auth::ACCOUNT_PAGE.to_string());
                    FormOutcome::success(
                        Notice::success("乐器发布成功！"),
                        Redirect::to(target, LONG_REDIRECT_DELAY),
                    )
                }
                Err(err) if err.is_transient() => {
                    FormOutcome::failure(Notice::error("发布失败，请检查网络"))
                }
                Err(err) => action_failure(&err, "发布失败"),
            },
        }
    }

    pub async fn delete(&self, id: InstrumentId) -> FormOutcome {
        match self.client.delete_instrument(id).await {
            Ok(_) => FormOutcome::success(
                Notice::success("乐器已删除"),
                Redirect::to(crate::auth::ACCOUNT_PAGE, LONG_REDIRECT_DELAY),
            ),
            Err(err) if err.is_transient() => {
                FormOutcome::failure(Notice::error("删除失败，请检查网络"))
            }
            Err(err) => action_failure(&err, "删除失败"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::instrument_json;
    use im_client::Method;
    use im_client::mock::{MockTransport, mock_client};

    #[test]
    fn search_params_and_href() {
        let params = SearchParams::from_query("?q=%E5%90%89%E4%BB%96&page=2");
        assert_eq!(params.keyword.as_deref(), Some("吉他"));
        assert_eq!(params.page, Some(2));
        assert_eq!(SearchParams::from_query("category=3").category, Some(CategoryId(3)));
        assert_eq!(search_href("  "), None);
        assert_eq!(search_href("小提琴 4/4").as_deref(), Some("search.html?q=%E5%B0%8F%E6%8F%90%E7%90%B4+4%2F4"));
    }

    #[test]
    fn main_image_index_field() {
        assert_eq!(parse_main_image_index(""), 0);
        assert_eq!(parse_main_image_index("2"), 2);
        assert_eq!(parse_main_image_index(" 3 "), 3);
        assert_eq!(parse_main_image_index("1st"), 1);
        assert_eq!(parse_main_image_index("abc"), 0);
        assert_eq!(parse_main_image_index("-1"), 0);
    }

    #[tokio::test]
    async fn home_sections_fail_independently() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(
            Method::Get,
            "/categories",
            200,
            r#"{"success":true,"categories":[{"id":1,"name":"吉他","instrument_count":3}]}"#,
        );
        transport.reply(Method::Get, "/instruments/hot", 500, r#"{"message":"db down"}"#);
        let latest = format!(r#"{{"success":true,"instruments":[{}]}}"#, instrument_json(7));
        transport.reply(Method::Get, "/instruments", 200, &latest);
        let client = mock_client(&transport);

        let home = CatalogController::new(&client).home().await;
        assert_eq!(home.categories.map(|c| c.len()), Some(1));
        assert_eq!(home.hot, None);
        assert_eq!(home.latest.map(|c| c[0].id), Some(InstrumentId(7)));

        let hot = transport.last_request_to(Method::Get, "/instruments/hot").expect("hot fetched");
        assert!(hot.url.ends_with("/instruments/hot?limit=6"));
        let listing = transport.last_request_to(Method::Get, "/instruments").expect("latest fetched");
        assert!(listing.url.ends_with("/instruments?page_size=12"));
        Ok(())
    }

    #[tokio::test]
    async fn missing_instrument_sends_the_visitor_home() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Get, "/instruments/404", 404, r#"{"success":false,"message":"乐器不存在"}"#);
        let client = mock_client(&transport);

        let outcome = CatalogController::new(&client).detail(InstrumentId(404)).await;
        assert_eq!(
            outcome,
            DetailOutcome::NotFound {
                notice: Notice::error("乐器不存在或已被下架"),
                redirect: Redirect::to(HOME_PAGE, NOT_FOUND_REDIRECT_DELAY),
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn related_excludes_current_and_caps_at_four() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        let items: Vec<String> = (1..=6).map(instrument_json).collect();
        let body = format!(r#"{{"success":true,"instruments":[{}]}}"#, items.join(","));
        transport.reply(Method::Get, "/instruments", 200, &body);
        let client = mock_client(&transport);

        let related = CatalogController::new(&client)
            .related(CategoryId(1), InstrumentId(2))
            .await?;
        let ids: Vec<i64> = related.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, [1, 3, 4, 5]);
        Ok(())
    }

    #[tokio::test]
    async fn buy_now_requires_login() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Post, "/orders", 401, r#"{"message":"请先登录"}"#);
        let client = mock_client(&transport);
        let catalog = CatalogController::new(&client);

        assert_eq!(catalog.buy_now(InstrumentId(3), 1).await, login_required());

        transport.clear_route(Method::Post, "/orders");
        transport.reply(Method::Post, "/orders", 200, r#"{"success":true,"order_id":"O-77"}"#);
        let outcome = catalog.buy_now(InstrumentId(3), 1).await;
        assert_eq!(
            outcome.redirect(),
            Some(&Redirect::to("order.html?order_id=O-77", LONG_REDIRECT_DELAY))
        );
        Ok(())
    }

    #[tokio::test]
    async fn favorite_posts_the_toggle_and_trusts_the_reply() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(
            Method::Post,
            "/instruments/5/favorite",
            200,
            r#"{"success":true,"is_favorited":true,"favorite_count":5}"#,
        );
        transport.reply(
            Method::Post,
            "/instruments/5/favorite",
            200,
            r#"{"success":true,"is_favorited":false,"favorite_count":4}"#,
        );
        let client = mock_client(&transport);
        let catalog = CatalogController::new(&client);

        let added = catalog.toggle_favorite(InstrumentId(5)).await;
        assert_eq!(
            added,
            FavoriteOutcome::Toggled {
                notice: Notice::success("已收藏"),
                favorited: true,
                count: 5,
            }
        );
        let removed = catalog.toggle_favorite(InstrumentId(5)).await;
        assert_eq!(
            removed,
            FavoriteOutcome::Toggled {
                notice: Notice::success("已取消收藏"),
                favorited: false,
                count: 4,
            }
        );
        assert_eq!(transport.requests_to(Method::Post, "/instruments/5/favorite").len(), 2);
        assert!(transport.requests_to(Method::Post, "/instruments/5/unfavorite").is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn publish_sends_multipart_and_opens_the_new_listing() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Post, "/instruments", 201, r#"{"success":true,"instrument_id":31}"#);
        let client = mock_client(&transport);
        let form = PublishForm {
            title: "雅马哈 F310".into(),
            price: "650".into(),
            category_id: Some(CategoryId(1)),
            main_image_index: 1,
            images: vec![
                FilePart {
                    file_name: "front.jpg".into(),
                    content_type: "image/jpeg".into(),
                    bytes: vec![1, 2, 3],
                },
                FilePart {
                    file_name: "back.jpg".into(),
                    content_type: "image/jpeg".into(),
                    bytes: vec![4, 5],
                },
            ],
            ..PublishForm::default()
        };

        let outcome = CatalogController::new(&client).publish(&form).await;
        assert_eq!(
            outcome.redirect(),
            Some(&Redirect::to("detail.html?id=31", LONG_REDIRECT_DELAY))
        );

        let sent = transport.last_request_to(Method::Post, "/instruments").expect("upload sent");
        let im_client::Body::Multipart(body) = sent.body else {
            anyhow::bail!("expected a multipart body");
        };
        assert_eq!(body.field("main_image_index"), Some("1"));
        assert_eq!(body.field("condition"), Some("good"));
        assert_eq!(body.files.iter().filter(|(name, _)| name == "images").count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn edit_mode_updates_in_place() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Put, "/instruments/8", 200, r#"{"success":true}"#);
        let client = mock_client(&transport);
        let mut form = PublishForm::from_instrument(&crate::testing::instrument(8));
        form.price = "700".into();

        let outcome = CatalogController::new(&client).publish(&form).await;
        assert!(outcome.is_success());
        assert_eq!(transport.requests_to(Method::Put, "/instruments/8").len(), 1);
        assert!(transport.requests_to(Method::Post, "/instruments").is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_publish_form_is_not_sent() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        let client = mock_client(&transport);
        let form = PublishForm {
            title: "琴".into(),
            price: "0".into(),
            ..PublishForm::default()
        };
        let outcome = CatalogController::new(&client).publish(&form).await;
        assert_eq!(outcome, FormOutcome::invalid("price", "请输入有效的价格"));
        assert!(transport.requests().is_empty());
        Ok(())
    }
}
