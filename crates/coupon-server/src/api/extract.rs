use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use coupon_core::ExtractedCoupon;
use coupon_extract::GenerativeModel;
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct ExtractRequest {
    #[serde(default)]
    prompt: Option<String>,
}

/// `POST /api/extract`: turns pasted coupon text into canonical fields.
///
/// Every failure, including an unreachable model, is reported to the caller
/// as a 400 with a single message.
pub(super) async fn extract_coupon<M: GenerativeModel + 'static>(
    State(state): State<AppState<M>>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractedCoupon>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::new("bad_request", e.body_text()))?;

    let prompt = request
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::new("validation_error", "Prompt is required"))?;

    match state.extractor.extract_coupon(&prompt).await {
        Ok(coupon) => {
            let extracted = ExtractedCoupon::new(coupon);
            tracing::info!(
                request_id = %req_id.0,
                coupon_id = %extracted.id,
                "coupon extracted"
            );
            Ok(Json(extracted))
        }
        Err(e) => {
            tracing::warn!(
                request_id = %req_id.0,
                transport = e.is_transport(),
                error = %e,
                "coupon extraction failed"
            );
            Err(ApiError::new("extraction_failed", e.to_string()))
        }
    }
}
