use im_api_types::{
    Ack, Category, CategoryId, CategoryList, Condition, FavoriteToggle, Instrument, InstrumentId,
    InstrumentList, InstrumentResponse, PublishResponse, SearchSuggestion, SearchSuggestions,
};
use url::form_urlencoded;

use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;
use crate::transport::{Method, MultipartForm, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Filters accepted by `GET /instruments` and `GET /search`. Unset fields
/// are omitted from the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub keyword: Option<String>,
    pub category_id: Option<CategoryId>,
    pub condition: Option<Condition>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl InstrumentQuery {
    pub fn page_size(size: u32) -> Self {
        Self {
            page_size: Some(size),
            ..Self::default()
        }
    }

    pub fn in_category(category_id: CategoryId, page_size: u32) -> Self {
        Self {
            category_id: Some(category_id),
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    fn append_to(&self, query: &mut form_urlencoded::Serializer<'_, String>) {
        if let Some(page) = self.page {
            query.append_pair("page", &page.to_string());
        }
        if let Some(size) = self.page_size {
            query.append_pair("page_size", &size.to_string());
        }
        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            query.append_pair("keyword", keyword.trim());
        }
        if let Some(category) = self.category_id {
            query.append_pair("category_id", &category.to_string());
        }
        if let Some(condition) = &self.condition {
            query.append_pair("condition", condition.as_str());
        }
        if let Some(min) = self.min_price {
            query.append_pair("min_price", &min.to_string());
        }
        if let Some(max) = self.max_price {
            query.append_pair("max_price", &max.to_string());
        }
        if let Some(sort_by) = &self.sort_by {
            query.append_pair("sort_by", sort_by);
        }
        if let Some(order) = self.sort_order {
            let order = match order {
                SortOrder::Asc => "asc",
                SortOrder::Desc => "desc",
            };
            query.append_pair("sort_order", order);
        }
    }

    pub fn to_query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        self.append_to(&mut query);
        query.finish()
    }
}

fn with_query(path: &str, query: String) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

impl<T: Transport> ApiClient<T> {
    pub async fn instruments(&self, query: &InstrumentQuery) -> Result<InstrumentList, ApiError> {
        let endpoint = with_query("/instruments", query.to_query_string());
        self.request(&endpoint, RequestOptions::get()).await
    }

    pub async fn hot_instruments(&self, limit: u32) -> Result<InstrumentList, ApiError> {
        let endpoint = format!("/instruments/hot?limit={limit}");
        self.request(&endpoint, RequestOptions::get()).await
    }

    pub async fn instrument(&self, id: InstrumentId) -> Result<Instrument, ApiError> {
        let body: InstrumentResponse = self
            .request(&format!("/instruments/{id}"), RequestOptions::get())
            .await?;
        Ok(body.instrument)
    }

    pub async fn publish_instrument(&self, form: MultipartForm) -> Result<PublishResponse, ApiError> {
        self.upload_request("/instruments", Method::Post, form).await
    }

    pub async fn update_instrument(
        &self,
        id: InstrumentId,
        form: MultipartForm,
    ) -> Result<PublishResponse, ApiError> {
        self.upload_request(&format!("/instruments/{id}"), Method::Put, form)
            .await
    }

    pub async fn delete_instrument(&self, id: InstrumentId) -> Result<Ack, ApiError> {
        self.request(&format!("/instruments/{id}"), RequestOptions::delete())
            .await
    }

    /// Toggles on servers that only expose `/favorite`.
    pub async fn favorite(&self, id: InstrumentId) -> Result<FavoriteToggle, ApiError> {
        self.request(&format!("/instruments/{id}/favorite"), RequestOptions::post())
            .await
    }

    /// Explicit removal, for servers that route it separately.
    pub async fn unfavorite(&self, id: InstrumentId) -> Result<FavoriteToggle, ApiError> {
        self.request(&format!("/instruments/{id}/unfavorite"), RequestOptions::post())
            .await
    }

    pub async fn favorites(&self) -> Result<InstrumentList, ApiError> {
        self.request("/user/favorites", RequestOptions::get()).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let body: CategoryList = self.request("/categories", RequestOptions::get()).await?;
        Ok(body.categories)
    }

    pub async fn search(
        &self,
        keyword: &str,
        filters: &InstrumentQuery,
    ) -> Result<InstrumentList, ApiError> {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("query", keyword);
        filters.append_to(&mut query);
        let endpoint = with_query("/search", query.finish());
        self.request(&endpoint, RequestOptions::get()).await
    }

    pub async fn search_suggestions(&self, prefix: &str) -> Result<Vec<SearchSuggestion>, ApiError> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("q", prefix)
            .finish();
        let body: SearchSuggestions = self
            .request(&with_query("/search/suggestions", query), RequestOptions::get())
            .await?;
        Ok(body.suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_omits_unset_filters() {
        assert_eq!(InstrumentQuery::default().to_query_string(), "");
        let query = InstrumentQuery {
            page: Some(2),
            keyword: Some(" 吉他 ".into()),
            condition: Some(Condition::LikeNew),
            sort_order: Some(SortOrder::Asc),
            ..InstrumentQuery::default()
        };
        assert_eq!(
            query.to_query_string(),
            "page=2&keyword=%E5%90%89%E4%BB%96&condition=like_new&sort_order=asc"
        );
    }

    #[test]
    fn category_listing_query() {
        let query = InstrumentQuery::in_category(CategoryId(4), 4);
        assert_eq!(with_query("/instruments", query.to_query_string()), "/instruments?page_size=4&category_id=4");
    }
}
