//! HTML fragments for `innerHTML`.
//!
//! Every interpolated value goes through [`escape`]. Inline handlers are not
//! emitted; buttons carry `data-*` attributes and the page binds listeners.

use im_api_types::SearchSuggestion;

use crate::format::format_price;
use crate::outcome::Notice;
use crate::view::{
    CartLine, CartPage, CategoryTile, DEFAULT_INSTRUMENT_IMAGE, DetailView, InstrumentCard,
    SellerCard,
};

pub const NO_RELATED: &str = "暂无相关乐器";
pub const NO_RESULTS: &str = "没有找到相关乐器";
pub const LOAD_FAILED: &str = "加载失败";

/// Escape text for element content and double-quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn card_image(src: &str, alt: &str) -> String {
    format!(
        r#"<img src="{}" alt="{}" data-fallback="{}">"#,
        escape(src),
        escape(alt),
        DEFAULT_INSTRUMENT_IMAGE,
    )
}

// ── Catalog ──

/// A listing card as used on the home and search pages.
pub fn instrument_card(card: &InstrumentCard) -> String {
    format!(
        r#"<div class="instrument-card" data-href="detail.html?id={id}">
  <div class="instrument-image">
    {image}
    <span class="condition-badge {class}">{label}</span>
  </div>
  <div class="instrument-info">
    <h3 class="title">{title}</h3>
    <p class="description">{excerpt}</p>
    <div class="price">{price}</div>
    <div class="meta">
      <span><i class="fas fa-eye"></i> {views}</span>
      <span><i class="fas fa-heart"></i> {favorites}</span>
    </div>
  </div>
</div>"#,
        id = card.id,
        image = card_image(&card.image, &card.title),
        class = escape(&card.condition_class),
        label = card.condition_label,
        title = escape(&card.title),
        excerpt = escape(&card.excerpt),
        price = card.price,
        views = card.views,
        favorites = card.favorites,
    )
}

/// The smaller card in the detail page's related grid.
pub fn related_card(card: &InstrumentCard) -> String {
    format!(
        r#"<div class="instrument-card" data-href="detail.html?id={id}">
  <div class="instrument-image">
    {image}
    <span class="condition-badge {class}">{label}</span>
  </div>
  <div class="instrument-info">
    <h4 class="title">{title}</h4>
    <div class="price">{price}</div>
  </div>
</div>"#,
        id = card.id,
        image = card_image(&card.image, &card.title),
        class = escape(&card.condition_class),
        label = card.condition_label,
        title = escape(&card.title),
        price = card.price,
    )
}

pub fn instrument_grid(cards: &[InstrumentCard], empty_text: &str) -> String {
    if cards.is_empty() {
        return no_data(empty_text);
    }
    cards.iter().map(instrument_card).collect()
}

pub fn related_grid(cards: &[InstrumentCard]) -> String {
    if cards.is_empty() {
        return no_data(NO_RELATED);
    }
    cards.iter().map(related_card).collect()
}

pub fn category_tile(tile: &CategoryTile) -> String {
    format!(
        r#"<div class="category-card" data-href="search.html?category={id}">
  <div class="category-icon"><i class="{icon}"></i></div>
  <h3>{name}</h3>
  <p>{count}件商品</p>
</div>"#,
        id = tile.id,
        icon = escape(&tile.icon),
        name = escape(&tile.name),
        count = tile.count,
    )
}

pub fn category_grid(tiles: &[CategoryTile]) -> String {
    tiles.iter().map(category_tile).collect()
}

/// `<option>` list for the publish form's category select.
pub fn category_options(tiles: &[CategoryTile], selected: Option<im_api_types::CategoryId>) -> String {
    tiles
        .iter()
        .map(|tile| {
            let mark = if Some(tile.id) == selected { " selected" } else { "" };
            format!(
                r#"<option value="{}"{mark}>{}</option>"#,
                tile.id,
                escape(&tile.name)
            )
        })
        .collect()
}

/// Type-ahead entries under the header search box.
pub fn suggestions(items: &[SearchSuggestion]) -> String {
    items
        .iter()
        .map(|item| match item {
            SearchSuggestion::Instrument { id, title, price } => format!(
                r#"<div class="suggestion-item" data-href="detail.html?id={id}"><i class="fas fa-guitar"></i> {} <span class="price">{}</span></div>"#,
                escape(title),
                format_price(*price),
            ),
            SearchSuggestion::Category { id, name } => format!(
                r#"<div class="suggestion-item" data-href="search.html?category={id}"><i class="fas fa-tags"></i> {}</div>"#,
                escape(name),
            ),
        })
        .collect()
}

pub fn no_data(text: &str) -> String {
    format!(r#"<p class="no-data">{}</p>"#, escape(text))
}

pub fn load_error(text: &str) -> String {
    format!(r#"<p class="error">{}</p>"#, escape(text))
}

// ── Detail ──

pub fn main_image(view: &DetailView) -> Option<String> {
    view.lead_image.as_ref().map(|src| {
        format!(
            r#"<img src="{}" alt="{}" id="currentImage">"#,
            escape(src),
            escape(&view.title)
        )
    })
}

pub fn thumbnails(view: &DetailView) -> String {
    view.thumbnails
        .iter()
        .enumerate()
        .map(|(index, src)| {
            let active = if index == 0 { " active" } else { "" };
            format!(
                r#"<div class="thumbnail{active}" data-src="{src}"><img src="{src}" alt="缩略图 {n}"></div>"#,
                src = escape(src),
                n = index + 1,
            )
        })
        .collect()
}

pub fn seller_card(seller: &SellerCard) -> String {
    format!(
        r#"<div class="seller-profile">
  <img src="{avatar}" alt="{name}" class="seller-avatar">
  <div class="seller-info">
    <h4>{name}</h4>
    <div class="seller-stats">
      <span class="credit-score"><i class="fas fa-star"></i> 信用分: {score}</span>
    </div>
  </div>
</div>
<div class="seller-actions">
  <button class="btn btn-outline btn-sm contact-seller-btn" data-seller-id="{id}">
    <i class="fas fa-comment"></i> 联系卖家
  </button>
</div>"#,
        avatar = escape(&seller.avatar),
        name = escape(&seller.name),
        score = seller.credit_score,
        id = seller.id.0,
    )
}

pub fn favorite_button(favorited: bool) -> &'static str {
    if favorited {
        r#"<i class="fas fa-heart"></i> 已收藏"#
    } else {
        r#"<i class="far fa-heart"></i> 收藏"#
    }
}

/// Existing images shown in the publish form when editing.
pub fn image_previews(urls: &[String]) -> String {
    urls.iter()
        .enumerate()
        .map(|(index, src)| {
            format!(
                r#"<img src="{}" class="preview-image" data-index="{index}">"#,
                escape(src)
            )
        })
        .collect()
}

// ── Cart ──

fn cart_line(line: &CartLine) -> String {
    let minus_state = if line.can_decrement() { "" } else { " disabled" };
    format!(
        r#"<div class="cart-item" data-item-id="{id}">
  <div class="item-info">
    {image}
    <div>
      <h4>{title}</h4>
      <p class="category">{category}</p>
      <p class="condition">成色：{condition}</p>
    </div>
  </div>
  <div class="item-price">{unit}</div>
  <div class="item-quantity">
    <button class="quantity-btn" data-item-id="{id}" data-quantity="{less}"{minus_state}><i class="fas fa-minus"></i></button>
    <span class="quantity">{quantity}</span>
    <button class="quantity-btn" data-item-id="{id}" data-quantity="{more}"><i class="fas fa-plus"></i></button>
  </div>
  <div class="item-total">{total}</div>
  <div class="item-actions">
    <button class="btn btn-outline btn-sm remove-item-btn" data-item-id="{id}"><i class="fas fa-trash"></i></button>
  </div>
</div>"#,
        id = line.id,
        image = card_image(&line.image, &line.title),
        title = escape(&line.title),
        category = escape(&line.category),
        condition = line.condition_label,
        unit = line.unit_price,
        less = i64::from(line.quantity) - 1,
        more = u64::from(line.quantity) + 1,
        quantity = line.quantity,
        total = line.line_total,
    )
}

pub fn cart_page(page: &CartPage) -> String {
    let (lines, total) = match page {
        CartPage::Empty => {
            return r#"<div class="empty-cart">
  <i class="fas fa-shopping-cart"></i>
  <h3>购物车是空的</h3>
  <p>去发现一些好乐器吧！</p>
  <a href="index.html" class="btn btn-primary">去逛逛</a>
</div>"#
                .to_string();
        }
        CartPage::Filled { lines, total } => (lines, total),
    };

    let items: String = lines.iter().map(cart_line).collect();
    format!(
        r#"<div class="cart-header">
  <h2>我的购物车 ({count}件商品)</h2>
  <button class="btn btn-outline" id="clearCartBtn"><i class="fas fa-trash"></i> 清空购物车</button>
</div>
<div class="cart-items">{items}</div>
<div class="cart-summary">
  <div class="summary-details">
    <div class="summary-row"><span>商品总数：</span><span>{count}件</span></div>
    <div class="summary-row"><span>商品总价：</span><span>{total}</span></div>
    <div class="summary-row total"><span>应付总额：</span><span class="total-price">{total}</span></div>
  </div>
  <div class="summary-actions">
    <a href="index.html" class="btn btn-outline">继续购物</a>
    <button class="btn btn-primary" id="checkoutBtn">去结算</button>
  </div>
</div>"#,
        count = lines.len(),
    )
}

// ── Notifications ──

/// Inner markup of a `.notification` toast.
pub fn notice(notice: &Notice) -> String {
    format!(
        r#"<span>{}</span><button class="notification-close">&times;</button>"#,
        escape(&notice.message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::instrument;

    #[test]
    fn markup_is_escaped() {
        assert_eq!(
            escape(r#"<b>"Fender" & 'Gibson'</b>"#),
            "&lt;b&gt;&quot;Fender&quot; &amp; &#39;Gibson&#39;&lt;/b&gt;"
        );
        let mut item = instrument(9);
        item.title = "<script>alert(1)</script>".into();
        let html = instrument_card(&InstrumentCard::from(&item));
        assert!(!html.contains("<script>"));
        assert!(html.contains("detail.html?id=9"));
        assert!(html.contains(r#"condition-badge like_new">几乎全新"#));
    }

    #[test]
    fn suggestions_link_to_listing_or_category() {
        let html = suggestions(&[
            SearchSuggestion::Instrument {
                id: im_api_types::InstrumentId(3),
                title: "电钢琴".into(),
                price: im_api_types::Price(2999.0),
            },
            SearchSuggestion::Category {
                id: im_api_types::CategoryId(2),
                name: "键盘".into(),
            },
        ]);
        assert!(html.contains(r#"data-href="detail.html?id=3""#));
        assert!(html.contains("¥2999.00"));
        assert!(html.contains(r#"data-href="search.html?category=2""#));
    }

    #[test]
    fn empty_related_grid_says_so() {
        assert_eq!(related_grid(&[]), no_data(NO_RELATED));
    }

    #[test]
    fn cart_markup_disables_minus_at_one() {
        let page = CartPage::Filled {
            lines: vec![CartLine {
                id: im_api_types::CartItemId(4),
                instrument_id: im_api_types::InstrumentId(9),
                title: "尤克里里".into(),
                image: DEFAULT_INSTRUMENT_IMAGE.into(),
                category: "弦乐".into(),
                condition_label: "良好",
                unit_price: "¥120.00".into(),
                quantity: 1,
                line_total: "¥120.00".into(),
            }],
            total: "¥120.00".into(),
        };
        let html = cart_page(&page);
        assert!(html.contains(r#"data-quantity="0" disabled"#));
        assert!(html.contains(r#"data-quantity="2""#));
        assert!(html.contains("我的购物车 (1件商品)"));
        assert!(cart_page(&CartPage::Empty).contains("购物车是空的"));
    }
}
