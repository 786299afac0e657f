use thiserror::Error;

/// Errors that abort an extraction.
///
/// Per-field coercion misses are not represented here; they degrade to `None`.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Network or TLS failure talking to the model endpoint.
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The model endpoint answered with a non-2xx status.
    #[error("model endpoint returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// A 2xx reply whose body is not a generate-content envelope.
    #[error("unexpected model endpoint response: {0}")]
    UpstreamBody(String),

    /// The configured endpoint root and model name do not form a valid URL.
    #[error("invalid model endpoint URL: {0}")]
    InvalidBaseUrl(String),

    /// The model's text is not a single JSON object.
    #[error("failed to parse extracted JSON: {0}")]
    Parse(#[source] serde_json::Error),
}

impl ExtractError {
    /// `true` when the failure happened before any model text was received.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::Parse(_))
    }
}
