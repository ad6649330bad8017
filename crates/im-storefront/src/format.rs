use chrono::{DateTime, NaiveDate, NaiveDateTime};
use im_api_types::{Condition, Price};

pub const UNKNOWN_DATE: &str = "未知";
pub const NO_DESCRIPTION: &str = "暂无描述";
const EXCERPT_CHARS: usize = 50;

/// Two decimals with ties rounded away from zero. `{:.2}` alone would round
/// `0.125` down to `0.12`.
fn fixed2(amount: f64) -> String {
    format!("{:.2}", (amount * 100.0).round() / 100.0)
}

/// `¥` plus two decimals.
pub fn format_price(price: Price) -> String {
    format!("¥{}", fixed2(price.amount()))
}

/// `¥` plus two decimals with thousands separators: `¥12,800.00`.
pub fn format_price_grouped(price: Price) -> String {
    let fixed = fixed2(price.amount().abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if price.amount() < 0.0 { "-" } else { "" };
    format!("¥{sign}{grouped}.{frac_part}")
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// `YYYY/MM/DD HH:MM`, or `未知` for anything unparseable.
pub fn format_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%Y/%m/%d %H:%M").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

/// Cut to `max_chars` characters and append `...` when anything was cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Card excerpt: the first 50 characters followed by `...`.
pub fn description_excerpt(description: Option<&str>) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(text) => {
            let head: String = text.chars().take(EXCERPT_CHARS).collect();
            format!("{head}...")
        }
        None => NO_DESCRIPTION.to_string(),
    }
}

/// Display text for a condition. Unrecognized values read as `良好`.
pub fn condition_label(condition: &Condition) -> &'static str {
    match condition {
        Condition::New => "全新",
        Condition::LikeNew => "几乎全新",
        Condition::Good => "良好",
        Condition::Fair => "一般",
        Condition::Poor => "较差",
        Condition::Other(_) => "良好",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_labels() {
        let labels: Vec<_> = Condition::ALL.iter().map(condition_label).collect();
        assert_eq!(labels, ["全新", "几乎全新", "良好", "一般", "较差"]);
        assert_eq!(condition_label(&Condition::from("mint")), "良好");
    }

    #[test]
    fn prices() {
        assert_eq!(format_price(Price(1280.0)), "¥1280.00");
        assert_eq!(format_price(Price::parse("99.5")), "¥99.50");
        assert_eq!(format_price(Price::parse("abc")), "¥0.00");
        assert_eq!(format_price_grouped(Price(1234567.891)), "¥1,234,567.89");
        assert_eq!(format_price_grouped(Price(999.0)), "¥999.00");
        assert_eq!(format_price_grouped(Price(-1500.0)), "¥-1,500.00");
    }

    #[test]
    fn price_ties_round_up() {
        assert_eq!(format_price(Price(0.125)), "¥0.13");
        assert_eq!(format_price(Price(-0.125)), "¥-0.13");
        assert_eq!(format_price(Price(12.5)), "¥12.50");
        assert_eq!(format_price_grouped(Price(1999.375)), "¥1,999.38");
        assert_eq!(format_price_grouped(Price(999.995)), "¥1,000.00");
    }

    #[test]
    fn dates() {
        assert_eq!(format_date("2024-03-05T09:07:00"), "2024/03/05 09:07");
        assert_eq!(format_date("2024-03-05 18:30:12.123"), "2024/03/05 18:30");
        assert_eq!(format_date("2024-03-05T18:30:00+08:00"), "2024/03/05 18:30");
        assert_eq!(format_date("2024-03-05"), "2024/03/05 00:00");
        assert_eq!(format_date("not a date"), UNKNOWN_DATE);
    }

    #[test]
    fn text_cutting_is_char_based() {
        assert_eq!(truncate_text("雅马哈吉他", 3), "雅马哈...");
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(description_excerpt(None), NO_DESCRIPTION);
        assert_eq!(description_excerpt(Some("  ")), NO_DESCRIPTION);
        assert_eq!(description_excerpt(Some("九成新")), "九成新...");
        let long = "琴".repeat(80);
        assert_eq!(description_excerpt(Some(&long)).chars().count(), 53);
    }
}
