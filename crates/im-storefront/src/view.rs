//! View models. Everything a template needs, already formatted.

use im_api_types::{
    Cart, CartItem, CartItemId, Category, CategoryId, Instrument, InstrumentId, SellerSummary,
    UserId,
};

use crate::format::{condition_label, description_excerpt, format_price};

pub const DEFAULT_INSTRUMENT_IMAGE: &str = "images/default-instrument.jpg";
pub const DEFAULT_AVATAR: &str = "images/default-avatar.svg";
pub const DEFAULT_CATEGORY_ICON: &str = "fas fa-guitar";

const UNSET: &str = "未知";
const NO_LOCATION: &str = "未设置";
const UNCATEGORIZED: &str = "未分类";

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentCard {
    pub id: InstrumentId,
    pub title: String,
    pub excerpt: String,
    pub price: String,
    pub image: String,
    pub condition_label: &'static str,
    /// Raw condition value, used as a CSS modifier.
    pub condition_class: String,
    pub views: u32,
    pub favorites: u32,
}

impl From<&Instrument> for InstrumentCard {
    fn from(instrument: &Instrument) -> Self {
        Self {
            id: instrument.id,
            title: instrument.title.clone(),
            excerpt: description_excerpt(instrument.description.as_deref()),
            price: format_price(instrument.price),
            image: non_empty(instrument.main_image.as_deref())
                .unwrap_or(DEFAULT_INSTRUMENT_IMAGE)
                .to_string(),
            condition_label: condition_label(&instrument.condition),
            condition_class: instrument.condition.as_str().to_string(),
            views: instrument.view_count,
            favorites: instrument.favorite_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTile {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
    pub count: u32,
}

impl From<&Category> for CategoryTile {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            icon: non_empty(category.icon.as_deref())
                .unwrap_or(DEFAULT_CATEGORY_ICON)
                .to_string(),
            count: category.instrument_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerCard {
    pub id: UserId,
    pub name: String,
    pub avatar: String,
    pub credit_score: i32,
}

impl From<&SellerSummary> for SellerCard {
    fn from(seller: &SellerSummary) -> Self {
        Self {
            id: seller.id,
            name: seller.display_name().to_string(),
            avatar: non_empty(seller.avatar.as_deref())
                .unwrap_or(DEFAULT_AVATAR)
                .to_string(),
            credit_score: seller.credit_score,
        }
    }
}

/// The detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub id: InstrumentId,
    pub title: String,
    pub document_title: String,
    pub breadcrumb: String,
    pub lead_image: Option<String>,
    /// Thumbnail URLs in gallery order; the first is marked active.
    pub thumbnails: Vec<String>,
    pub price: String,
    pub original_price: Option<String>,
    pub description: String,
    pub brand: String,
    pub model: String,
    pub condition_label: &'static str,
    pub condition_class: String,
    pub location: String,
    pub audio_url: Option<String>,
    pub views: u32,
    pub favorites: u32,
    pub favorited: bool,
    pub seller: Option<SellerCard>,
    pub category_id: Option<CategoryId>,
}

impl From<&Instrument> for DetailView {
    fn from(instrument: &Instrument) -> Self {
        Self {
            id: instrument.id,
            title: instrument.title.clone(),
            document_title: format!("{} - 校园乐器汇", instrument.title),
            breadcrumb: non_empty(instrument.category_name.as_deref())
                .unwrap_or(&instrument.title)
                .to_string(),
            lead_image: instrument.lead_image().map(|img| img.full_url.clone()),
            thumbnails: instrument
                .images
                .iter()
                .map(|img| img.full_url.clone())
                .collect(),
            price: format_price(instrument.price),
            original_price: instrument
                .original_price
                .filter(|p| p.amount() > 0.0)
                .map(format_price),
            description: instrument.description.clone().unwrap_or_default(),
            brand: non_empty(instrument.brand.as_deref()).unwrap_or(UNSET).to_string(),
            model: non_empty(instrument.model.as_deref()).unwrap_or(UNSET).to_string(),
            condition_label: condition_label(&instrument.condition),
            condition_class: instrument.condition.as_str().to_string(),
            location: non_empty(instrument.location.as_deref())
                .unwrap_or(NO_LOCATION)
                .to_string(),
            audio_url: non_empty(instrument.audio_url.as_deref()).map(str::to_string),
            views: instrument.view_count,
            favorites: instrument.favorite_count,
            favorited: instrument.is_favorited,
            seller: instrument.user.as_ref().map(SellerCard::from),
            category_id: instrument.category_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub id: CartItemId,
    pub instrument_id: InstrumentId,
    pub title: String,
    pub image: String,
    pub category: String,
    pub condition_label: &'static str,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl CartLine {
    /// The minus button is disabled at quantity 1.
    pub fn can_decrement(&self) -> bool {
        self.quantity > 1
    }
}

impl From<&CartItem> for CartLine {
    fn from(item: &CartItem) -> Self {
        let instrument = &item.instrument;
        Self {
            id: item.id,
            instrument_id: instrument.id,
            title: instrument.title.clone(),
            image: non_empty(instrument.main_image.as_deref())
                .unwrap_or(DEFAULT_INSTRUMENT_IMAGE)
                .to_string(),
            category: non_empty(instrument.category_name.as_deref())
                .unwrap_or(UNCATEGORIZED)
                .to_string(),
            condition_label: condition_label(&instrument.condition),
            unit_price: format_price(instrument.price),
            quantity: item.quantity,
            line_total: format_price(instrument.price.times(item.quantity)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartPage {
    Empty,
    Filled {
        lines: Vec<CartLine>,
        total: String,
    },
}

impl From<&Cart> for CartPage {
    fn from(cart: &Cart) -> Self {
        if cart.is_empty() {
            return CartPage::Empty;
        }
        // `total_price` may be absent.
        let total = if cart.total_price.amount() > 0.0 {
            cart.total_price
        } else {
            cart.computed_total()
        };
        CartPage::Filled {
            lines: cart.items.iter().map(CartLine::from).collect(),
            total: format_price(total),
        }
    }
}
