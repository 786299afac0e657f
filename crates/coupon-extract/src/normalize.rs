//! Turns raw model text into a [`CouponRequest`].
//!
//! 1. Strip a surrounding markdown code fence.
//! 2. Parse the remainder as a single JSON object (the only hard failure).
//! 3. Coerce each known key independently; misses become `None`.
//! 4. Default `validFrom` to today when it is missing or unparseable.

use chrono::{Local, NaiveDate};
use coupon_core::CouponRequest;
use serde_json::{Map, Value};

use crate::coerce::{
    coerce_bool, coerce_date, coerce_decimal, coerce_discount_type, coerce_i32, coerce_string,
};
use crate::error::ExtractError;

const FENCE: &str = "```";

/// Removes one leading fence opener (with an optional language tag such as
/// `json`) and one trailing fence closer, trimming whitespace around both.
///
/// `None` is treated as the empty object `{}`. Text without fences is only
/// trimmed, so applying this twice is the same as applying it once to a
/// fenced object.
#[must_use]
pub fn strip_code_fence(raw: Option<&str>) -> &str {
    let Some(text) = raw else {
        return "{}";
    };

    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix(FENCE) {
        s = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    }
    if let Some(rest) = s.strip_suffix(FENCE) {
        s = rest;
    }
    s.trim()
}

/// Parses fence-stripped text as a single JSON object.
///
/// # Errors
///
/// Returns [`ExtractError::Parse`] for malformed JSON, trailing text, or a
/// top-level value that is not an object.
pub fn parse_field_map(json: &str) -> Result<Map<String, Value>, ExtractError> {
    serde_json::from_str::<Map<String, Value>>(json).map_err(|e| {
        tracing::warn!(error = %e, len = json.len(), "model response is not a JSON object");
        ExtractError::Parse(e)
    })
}

/// Coerces every known key of `map` into the canonical coupon fields.
///
/// Never fails. `today` becomes `valid_from` when the map has no usable date.
#[must_use]
pub fn coerce_coupon(map: &Map<String, Value>, today: NaiveDate) -> CouponRequest {
    let valid_from = field(map, "validFrom", coerce_date).unwrap_or(today);

    CouponRequest {
        title: field(map, "title", coerce_string),
        description: field(map, "description", coerce_string),
        code: field(map, "code", coerce_string),
        platform: field(map, "platform", coerce_string),
        category: field(map, "category", coerce_string),
        discount_type: field(map, "discountType", coerce_discount_type),
        discount_value: field(map, "discountValue", coerce_decimal),
        min_order_value: field(map, "minOrderValue", coerce_decimal),
        max_discount_value: field(map, "maxDiscountValue", coerce_decimal),
        valid_from,
        valid_till: field(map, "validTill", coerce_date),
        terms: field(map, "terms", coerce_string),
        requires_unique_user: field(map, "requiresUniqueUser", coerce_bool),
        usage_type: field(map, "usageType", coerce_string),
        geo_restriction: field(map, "geoRestriction", coerce_string),
        is_active: field(map, "isActive", coerce_bool),
        total_quantity: field(map, "totalQuantity", coerce_i32),
        price: field(map, "price", coerce_decimal),
        is_free: field(map, "isFree", coerce_bool),
    }
}

/// Normalizes raw model text using today's local date as the `validFrom`
/// fallback.
///
/// # Errors
///
/// Returns [`ExtractError::Parse`] when the stripped text is not a JSON object.
pub fn normalize(raw: Option<&str>) -> Result<CouponRequest, ExtractError> {
    normalize_at(raw, Local::now().date_naive())
}

/// Same as [`normalize`] with an explicit fallback date.
///
/// # Errors
///
/// Returns [`ExtractError::Parse`] when the stripped text is not a JSON object.
pub fn normalize_at(raw: Option<&str>, today: NaiveDate) -> Result<CouponRequest, ExtractError> {
    let json = strip_code_fence(raw);
    let map = parse_field_map(json)?;
    Ok(coerce_coupon(&map, today))
}

fn field<T>(
    map: &Map<String, Value>,
    key: &'static str,
    coerce: fn(Option<&Value>) -> Option<T>,
) -> Option<T> {
    let value = map.get(key);
    let coerced = coerce(value);
    if coerced.is_none() && value.is_some_and(|v| !v.is_null()) {
        tracing::debug!(field = key, "dropping field that could not be coerced");
    }
    coerced
}
