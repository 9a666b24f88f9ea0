use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

fn non_numeric() -> &'static Regex {
    static NON_NUMERIC: OnceLock<Regex> = OnceLock::new();
    NON_NUMERIC.get_or_init(|| Regex::new(r"[^\d,.]").unwrap())
}

/// Converts a comma-decimal, dot-thousands price such as `R$ 1.234,56`
/// into `1234.56`.
///
/// Anything that does not survive as a number after separator rewriting
/// yields `None`; this never panics.
pub fn normalize_currency(text: &str) -> Option<Decimal> {
    let filtered = non_numeric().replace_all(text, "");
    if !filtered.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = filtered.replace('.', "").replace(',', ".");
    Decimal::from_str(&normalized).ok()
}
