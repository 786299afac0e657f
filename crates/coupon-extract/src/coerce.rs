//! Total coercions from loosely-typed JSON values into coupon field types.
//!
//! Every function takes the value found under a key (or `None` when the key
//! is absent) and returns `None` for JSON `null` or for anything that cannot
//! be coerced. None of them fail.

use chrono::NaiveDate;
use coupon_core::DiscountType;
use rust_decimal::Decimal;
use serde_json::{Number, Value};

/// `null` stays `None`; strings are trimmed; anything else is rendered as
/// compact JSON text and trimmed.
#[must_use]
pub fn coerce_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_owned()),
        other => Some(other.to_string().trim().to_owned()),
    }
}

/// Native booleans pass through; strings must be exactly `"true"` or `"false"`.
#[must_use]
pub fn coerce_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Numbers are truncated toward zero; numeric strings are parsed. Values
/// outside the `i32` range become `None`.
#[must_use]
pub fn coerce_i32(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(n) => number_to_i32(n),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

/// Numbers convert through their textual form so `19.99` stays exactly
/// `19.99`; numeric strings are parsed directly.
#[must_use]
pub fn coerce_decimal(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::Number(n) => number_to_decimal(n),
        Value::String(s) => decimal_from_text(s.trim()),
        _ => None,
    }
}

/// Accepts non-empty `yyyy-MM-dd` strings only.
#[must_use]
pub fn coerce_date(value: Option<&Value>) -> Option<NaiveDate> {
    let Value::String(s) = value? else {
        return None;
    };
    let s = s.trim();
    if !is_iso_date_shape(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Uppercases and trims, then matches against [`DiscountType`]. Unknown
/// labels become `None` rather than an error.
#[must_use]
pub fn coerce_discount_type(value: Option<&Value>) -> Option<DiscountType> {
    match value? {
        Value::Null => None,
        Value::String(s) => DiscountType::from_label(s),
        other => DiscountType::from_label(&other.to_string()),
    }
}

fn number_to_i32(n: &Number) -> Option<i32> {
    if let Some(i) = n.as_i64() {
        return i32::try_from(i).ok();
    }
    if let Some(u) = n.as_u64() {
        return i32::try_from(u).ok();
    }
    let truncated = n.as_f64()?.trunc();
    if truncated.is_finite()
        && truncated >= f64::from(i32::MIN)
        && truncated <= f64::from(i32::MAX)
    {
        #[allow(clippy::cast_possible_truncation)]
        let n = truncated as i32;
        Some(n)
    } else {
        None
    }
}

fn number_to_decimal(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }
    // Shortest round-trip text of the float, e.g. "19.99" or "1e-7".
    decimal_from_text(&n.to_string())
}

/// Rejects digit separators and anything that would need rounding to fit.
fn decimal_from_text(s: &str) -> Option<Decimal> {
    if s.is_empty() || s.contains('_') {
        return None;
    }
    if let Some((mantissa, _)) = s.split_once(['e', 'E']) {
        // `from_scientific` rounds an over-long mantissa instead of failing.
        Decimal::from_str_exact(mantissa).ok()?;
        return Decimal::from_scientific(s).ok();
    }
    Decimal::from_str_exact(s).ok()
}

fn is_iso_date_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
}
