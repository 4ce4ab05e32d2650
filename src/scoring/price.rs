use regex::Regex;
use std::sync::OnceLock;

static PRICE_TOKEN: OnceLock<Regex> = OnceLock::new();

fn price_token() -> &'static Regex {
    PRICE_TOKEN.get_or_init(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("valid price pattern"))
}

/// Extract the first numeric token from localized price text.
///
/// `"10,80 €"` → `10.8`, `"€15"` → `15.0`, `"25.00 EUR"` → `25.0`.
/// Returns `None` when the text holds no digits at all.
///
/// Only the first token counts and `,` is always read as a decimal separator,
/// so `"1.234,56 €"` yields `1.234`. Thousands separators are not handled.
pub fn parse_price(text: &str) -> Option<f64> {
    let token = price_token().find(text)?;
    token.as_str().replace(',', ".").parse::<f64>().ok()
}
