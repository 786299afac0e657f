//! Coupon extraction from unstructured text.
//!
//! Builds a fixed instruction prompt around pasted coupon text, makes a single
//! call to a generative model, and normalizes the model's loosely-typed JSON
//! reply into a [`CouponRequest`]. Only transport failures and unparseable
//! replies are errors; individual fields that cannot be coerced become `None`.

pub mod coerce;
pub mod error;
pub mod gateway;
pub mod gemini;
pub mod normalize;

pub use coupon_core::CouponRequest;
pub use error::ExtractError;
pub use gateway::{build_prompt, Extractor, GenerativeModel, INSTRUCTIONS};
pub use gemini::GeminiClient;
pub use normalize::{coerce_coupon, normalize, normalize_at, parse_field_map, strip_code_fence};
