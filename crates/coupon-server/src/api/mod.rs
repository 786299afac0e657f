mod extract;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use coupon_extract::{Extractor, GenerativeModel};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, REQUEST_ID_HEADER};

pub struct AppState<M> {
    pub extractor: Arc<Extractor<M>>,
}

impl<M> Clone for AppState<M> {
    fn clone(&self) -> Self {
        Self {
            extractor: Arc::clone(&self.extractor),
        }
    }
}

impl<M: GenerativeModel> AppState<M> {
    pub fn new(extractor: Extractor<M>) -> Self {
        Self {
            extractor: Arc::new(extractor),
        }
    }
}

/// Client-facing error envelope. Serializes as `{"message": ...}`; `code`
/// only selects the status.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code.as_str() {
            "bad_request" | "validation_error" | "extraction_failed" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// CORS for the browser frontend. Credentials are allowed, so origins must be
/// listed explicitly.
pub fn build_cors(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ]))
}

pub fn build_app<M>(state: AppState<M>, cors: CorsLayer) -> Router
where
    M: GenerativeModel + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/health", get(health))
        .route("/api/extract", post(extract::extract_coupon::<M>))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    tracing::debug!("health check");
    Json(HealthData { status: "UP" })
}
