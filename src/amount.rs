use regex::Regex;
use std::sync::LazyLock;

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number pattern")
});

/// Reads the leading numeric prefix of `input` ("12.5abc" -> 12.5).
/// Returns `None` when there is no number at the start.
pub fn parse_lenient(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let m = LEADING_NUMBER.find(trimmed)?;
    m.as_str().parse::<f64>().ok()
}

/// Amount entered for a customer: anything unparseable, negative or
/// non-finite becomes 0.
pub fn clamp_amount(input: &str) -> f64 {
    match parse_lenient(input) {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

pub fn money(symbol: &str, value: f64) -> String {
    format!("{}{:.2}", symbol, value)
}
