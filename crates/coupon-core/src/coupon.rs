use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a coupon's discount is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// A fixed amount off the order.
    Flat,
    /// A percentage of the order value.
    Percentage,
}

impl DiscountType {
    /// Matches a label against the enumeration after trimming and uppercasing.
    ///
    /// Returns `None` for anything other than `FLAT` or `PERCENTAGE`,
    /// including the empty string.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "FLAT" => Some(Self::Flat),
            "PERCENTAGE" => Some(Self::Percentage),
            _ => None,
        }
    }
}

/// Documented values for [`CouponRequest::usage_type`].
///
/// The field is free text; these are the values the extraction prompt asks for.
pub mod usage_type {
    pub const SINGLE_USE: &str = "SINGLE_USE";
    pub const MULTI_USE: &str = "MULTI_USE";
    pub const UNLIMITED: &str = "UNLIMITED";
}

/// Canonical coupon fields, as produced by extraction and consumed by whatever
/// persists or displays the coupon.
///
/// Every field is optional except `valid_from`, which always resolves to a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    /// Store or app the coupon applies to, e.g. `"Swiggy"`.
    pub platform: Option<String>,
    pub category: Option<String>,
    pub discount_type: Option<DiscountType>,
    /// Amount off for [`DiscountType::Flat`], percent for [`DiscountType::Percentage`].
    pub discount_value: Option<Decimal>,
    pub min_order_value: Option<Decimal>,
    pub max_discount_value: Option<Decimal>,
    pub valid_from: NaiveDate,
    pub valid_till: Option<NaiveDate>,
    /// Fine print gathered from the source text.
    pub terms: Option<String>,
    pub requires_unique_user: Option<bool>,
    /// See [`usage_type`] for documented values.
    pub usage_type: Option<String>,
    pub geo_restriction: Option<String>,
    pub is_active: Option<bool>,
    pub total_quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub is_free: Option<bool>,
}

impl CouponRequest {
    /// A request with every optional field unset.
    #[must_use]
    pub fn empty(valid_from: NaiveDate) -> Self {
        Self {
            title: None,
            description: None,
            code: None,
            platform: None,
            category: None,
            discount_type: None,
            discount_value: None,
            min_order_value: None,
            max_discount_value: None,
            valid_from,
            valid_till: None,
            terms: None,
            requires_unique_user: None,
            usage_type: None,
            geo_restriction: None,
            is_active: None,
            total_quantity: None,
            price: None,
            is_free: None,
        }
    }
}

/// Extraction result returned to API callers: the canonical fields plus a
/// server-generated identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedCoupon {
    pub id: Uuid,
    #[serde(flatten)]
    pub coupon: CouponRequest,
}

impl ExtractedCoupon {
    #[must_use]
    pub fn new(coupon: CouponRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            coupon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn discount_type_from_label_is_case_insensitive_and_trimmed() {
        assert_eq!(DiscountType::from_label("flat"), Some(DiscountType::Flat));
        assert_eq!(DiscountType::from_label("FLAT"), Some(DiscountType::Flat));
        assert_eq!(DiscountType::from_label(" Flat "), Some(DiscountType::Flat));
        assert_eq!(
            DiscountType::from_label("percentage"),
            Some(DiscountType::Percentage)
        );
    }

    #[test]
    fn discount_type_from_label_rejects_unknown_and_empty() {
        assert_eq!(DiscountType::from_label("BOGO"), None);
        assert_eq!(DiscountType::from_label(""), None);
        assert_eq!(DiscountType::from_label("   "), None);
    }

    #[test]
    fn discount_type_wire_labels_parse_back_through_from_label() {
        for kind in [DiscountType::Flat, DiscountType::Percentage] {
            let label = serde_json::to_value(kind).expect("serialize");
            let label = label.as_str().expect("string label");
            assert_eq!(DiscountType::from_label(label), Some(kind), "label {label}");
        }
    }

    #[test]
    fn coupon_request_serializes_camel_case_with_nulls() {
        let mut coupon = CouponRequest::empty(date(2024, 3, 15));
        coupon.discount_type = Some(DiscountType::Percentage);
        coupon.total_quantity = Some(10);

        let json = serde_json::to_value(&coupon).expect("serialize");
        assert_eq!(json["validFrom"], "2024-03-15");
        assert_eq!(json["discountType"], "PERCENTAGE");
        assert_eq!(json["totalQuantity"], 10);
        assert!(json["title"].is_null());
        assert!(json["maxDiscountValue"].is_null());
        assert!(json.get("requiresUniqueUser").is_some());
    }

    #[test]
    fn extracted_coupon_flattens_fields_beside_id() {
        let mut coupon = CouponRequest::empty(date(2024, 1, 1));
        coupon.title = Some("Free delivery".to_string());
        let extracted = ExtractedCoupon::new(coupon);

        let json = serde_json::to_value(&extracted).expect("serialize");
        assert_eq!(json["title"], "Free delivery");
        assert_eq!(json["id"], extracted.id.to_string());
        assert!(json.get("coupon").is_none());
    }
}
