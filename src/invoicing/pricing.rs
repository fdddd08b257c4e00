//! Invoice pricing
//!
//! Pure arithmetic over quantity, unit price and discount percentage. There
//! are no error conditions: absent or non-finite inputs count as 0 and the
//! discount is clamped into `[0, 100]` when it is entered.

use serde::{Deserialize, Serialize};

/// Largest accepted discount percentage
pub const MAX_DISCOUNT: f64 = 100.0;

/// Treat absent, NaN and infinite inputs as 0
pub fn sanitize(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Clamp a discount percentage into `[0, 100]`
pub fn clamp_discount(discount: Option<f64>) -> f64 {
    sanitize(discount).clamp(0.0, MAX_DISCOUNT)
}

/// `quantity × unit_price`
pub fn sub_total(quantity: f64, unit_price: f64) -> f64 {
    sanitize(Some(quantity)) * sanitize(Some(unit_price))
}

/// `sub_total − sub_total × discount / 100`
pub fn total(sub_total: f64, discount: f64) -> f64 {
    let sub_total = sanitize(Some(sub_total));
    sub_total - sub_total * clamp_discount(Some(discount)) / 100.0
}

/// Derived monetary fields of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub sub_total: f64,
    pub total: f64,
}

impl Pricing {
    pub fn derive(quantity: Option<f64>, unit_price: Option<f64>, discount: Option<f64>) -> Self {
        let sub_total = sub_total(sanitize(quantity), sanitize(unit_price));
        Self {
            sub_total,
            total: total(sub_total, clamp_discount(discount)),
        }
    }
}
