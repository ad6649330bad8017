use serde::{Deserialize, Serialize};

/// A price in yuan.
///
/// The server emits prices as JSON numbers, but form-sourced values arrive as
/// numeric strings. Both decode; anything unparseable decodes as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "PriceRepr")]
pub struct Price(pub f64);

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceRepr {
    Number(f64),
    Text(String),
    Null(()),
}

impl From<PriceRepr> for Price {
    fn from(repr: PriceRepr) -> Self {
        match repr {
            PriceRepr::Number(value) => Price(value),
            PriceRepr::Text(text) => Price::parse(&text),
            PriceRepr::Null(()) => Price(0.0),
        }
    }
}

impl Price {
    /// Parse a user or server supplied amount, falling back to zero.
    pub fn parse(text: &str) -> Self {
        Price(text.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0))
    }

    pub fn amount(self) -> f64 {
        self.0
    }

    pub fn times(self, quantity: u32) -> Self {
        Price(self.0 * f64::from(quantity))
    }
}

impl From<f64> for Price {
    fn from(value: f64) -> Self {
        Price(value)
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self {
        Price(iter.map(|p| p.0).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_numbers_and_numeric_strings() {
        let values: Vec<Price> = serde_json::from_str(r#"[9, 12.5, "12.5", " 3 ", "abc", null]"#)
            .expect("prices decode");
        assert_eq!(
            values,
            vec![Price(9.0), Price(12.5), Price(12.5), Price(3.0), Price(0.0), Price(0.0)]
        );
    }

    #[test]
    fn line_totals_multiply_by_quantity() {
        assert_eq!(Price(19.5).times(3), Price(58.5));
        let total: Price = [Price(1.25), Price(2.75)].into_iter().sum();
        assert_eq!(total, Price(4.0));
    }
}
