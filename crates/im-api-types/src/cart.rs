use serde::{Deserialize, Serialize};

use crate::Price;
use crate::instrument::{Instrument, InstrumentId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CartItemId(pub i64);

impl std::fmt::Display for CartItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub id: CartItemId,
    pub quantity: u32,
    pub instrument: Instrument,
    #[serde(default)]
    pub item_total: Option<Price>,
}

impl CartItem {
    /// Line total, preferring the server's figure when present.
    pub fn line_total(&self) -> Price {
        self.item_total
            .unwrap_or_else(|| self.instrument.price.times(self.quantity))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_price: Price,
    #[serde(default)]
    pub item_count: Option<u32>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines; this is what the navbar badge shows.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of line totals computed from unit price and quantity.
    pub fn computed_total(&self) -> Price {
        self.items
            .iter()
            .map(|item| item.instrument.price.times(item.quantity))
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToCartRequest {
    pub instrument_id: InstrumentId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddToCartResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub cart_item_id: Option<CartItemId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCartRequest {
    pub quantity: u32,
}
