//! Monetary value and currency extraction

use crate::notification::{Amount, LineItem};

/// Currency used when the platform omits one
pub const DEFAULT_CURRENCY: &str = "USD";

/// Convert a minor-unit amount into major units.
///
/// Returns `None` for an absent, non-numeric, zero or negative amount; such
/// events carry no advertising signal.
pub fn extract_value(total_price: Option<&Amount>) -> Option<f64> {
    let value = minor_to_major(total_price?.minor_units()?);
    (value > 0.0).then_some(value)
}

/// Cart value from the sum of `price * quantity` over the line items.
///
/// Same positivity rule as [`extract_value`]; an empty cart is skipped.
pub fn line_items_value(line_items: Option<&[LineItem]>) -> Option<f64> {
    let minor: f64 = line_items?.iter().map(LineItem::line_total).sum();
    let value = minor_to_major(minor);
    (value > 0.0).then_some(value)
}

/// Divide by 100 and round to cents
pub fn minor_to_major(minor: f64) -> f64 {
    minor.round() / 100.0
}

/// Format a minor-unit amount as a two-decimal major-unit string
pub fn format_major(minor: f64) -> String {
    format!("{:.2}", minor / 100.0)
}

/// Currency code, defaulting to [`DEFAULT_CURRENCY`] when absent or blank
pub fn resolve_currency(currency: Option<&str>) -> String {
    currency
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CURRENCY)
        .to_string()
}
