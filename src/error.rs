//! Error types for the proxy pipeline.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors raised while proxying a single request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// A target URL could not be parsed. Not retryable.
    #[error("malformed url '{url}': {source}")]
    MalformedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The outbound fetch failed (network, DNS, TLS).
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Redirect re-proxying exceeded the configured hop bound.
    #[error("too many upstream redirects (limit {limit})")]
    TooManyRedirects { limit: u32 },

    /// A configured or computed value is not a legal header value.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] axum::http::header::InvalidHeaderValue),

    /// The upstream transport could not be constructed.
    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ProxyError {
    pub fn malformed_url(url: impl Into<String>, source: url::ParseError) -> Self {
        ProxyError::MalformedUrl { url: url.into(), source }
    }

    /// Status code reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MalformedUrl { .. } => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::TooManyRedirects { .. } => StatusCode::LOOP_DETECTED,
            ProxyError::InvalidHeader(_) | ProxyError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Proxy request failed");
        } else {
            tracing::warn!(error = %self, status = %status, "Rejected request");
        }
        (status, self.to_string()).into_response()
    }
}

/// Result type alias for `ProxyError`.
pub type Result<T> = std::result::Result<T, ProxyError>;
