use serde::{Deserialize, Serialize};

use crate::Price;
use crate::auth::UserId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct InstrumentId(pub i64);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CategoryId(pub i64);

impl std::fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Item quality classification.
///
/// Values outside the five known ones are kept verbatim in `Other` so they
/// can still be echoed back (e.g. as a CSS class).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    New,
    LikeNew,
    Good,
    Fair,
    Poor,
    Other(String),
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::New,
        Condition::LikeNew,
        Condition::Good,
        Condition::Fair,
        Condition::Poor,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Condition::New => "new",
            Condition::LikeNew => "like_new",
            Condition::Good => "good",
            Condition::Fair => "fair",
            Condition::Poor => "poor",
            Condition::Other(raw) => raw,
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Condition::Good
    }
}

impl From<&str> for Condition {
    fn from(raw: &str) -> Self {
        match raw {
            "new" => Condition::New,
            "like_new" => Condition::LikeNew,
            "good" => Condition::Good,
            "fair" => Condition::Fair,
            "poor" => Condition::Poor,
            other => Condition::Other(other.to_owned()),
        }
    }
}

impl From<String> for Condition {
    fn from(raw: String) -> Self {
        Condition::from(raw.as_str())
    }
}

impl From<Condition> for String {
    fn from(condition: Condition) -> Self {
        condition.as_str().to_owned()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentStatus {
    #[default]
    Available,
    Pending,
    Sold,
    Removed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstrumentImage {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub is_main: bool,
    pub full_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellerSummary {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub credit_score: i32,
}

impl SellerSummary {
    pub fn display_name(&self) -> &str {
        match self.real_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

/// An instrument listing. The same shape serves list cards and the detail
/// page; the detail endpoint additionally fills `is_favorited`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instrument {
    pub id: InstrumentId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub status: InstrumentStatus,
    #[serde(default)]
    pub view_count: u32,
    #[serde(default)]
    pub favorite_count: u32,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub images: Vec<InstrumentImage>,
    #[serde(default)]
    pub user: Option<SellerSummary>,
    #[serde(default)]
    pub is_favorited: bool,
}

impl Instrument {
    /// The gallery's lead image: the one flagged main, else the first.
    pub fn lead_image(&self) -> Option<&InstrumentImage> {
        self.images
            .iter()
            .find(|img| img.is_main)
            .or_else(|| self.images.first())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u32,
    pub pages: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstrumentList {
    #[serde(default)]
    pub instruments: Vec<Instrument>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentResponse {
    pub instrument: Instrument,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResponse {
    #[serde(default)]
    pub instrument_id: Option<InstrumentId>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteToggle {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub is_favorited: bool,
    #[serde(default)]
    pub favorite_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub instrument_count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryList {
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchSuggestion {
    Instrument {
        id: InstrumentId,
        title: String,
        #[serde(default)]
        price: Price,
    },
    Category {
        id: CategoryId,
        name: String,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSuggestions {
    #[serde(default)]
    pub suggestions: Vec<SearchSuggestion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_keeps_unknown_values() {
        let parsed: Vec<Condition> =
            serde_json::from_str(r#"["new","like_new","mint"]"#).expect("conditions decode");
        assert_eq!(
            parsed,
            vec![Condition::New, Condition::LikeNew, Condition::Other("mint".into())]
        );
        assert_eq!(serde_json::to_string(&Condition::LikeNew).unwrap(), r#""like_new""#);
    }

    #[test]
    fn lead_image_prefers_main_flag() {
        let instrument: Instrument = serde_json::from_str(
            r#"{
                "id": 3, "title": "Yamaha F310", "price": 450,
                "images": [
                    {"full_url": "/static/uploads/a.jpg", "is_main": false},
                    {"full_url": "/static/uploads/b.jpg", "is_main": true}
                ]
            }"#,
        )
        .expect("instrument decodes");
        assert_eq!(instrument.lead_image().unwrap().full_url, "/static/uploads/b.jpg");
        assert_eq!(instrument.condition, Condition::Good);
    }

    #[test]
    fn suggestions_are_tagged_by_type() {
        let list: SearchSuggestions = serde_json::from_str(
            r#"{"suggestions":[{"type":"instrument","id":1,"title":"Erhu","price":"300"},{"type":"category","id":2,"name":"民乐"}]}"#,
        )
        .expect("suggestions decode");
        assert_eq!(list.suggestions.len(), 2);
        assert!(matches!(
            &list.suggestions[0],
            SearchSuggestion::Instrument { price, .. } if *price == Price(300.0)
        ));
    }
}
