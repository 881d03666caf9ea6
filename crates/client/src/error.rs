//! Error types for the USAspending client.

use serde::Deserialize;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Longest slice of an upstream error body carried in [`ClientError::Api`].
const BODY_EXCERPT_LIMIT: usize = 512;

/// Error types that can occur when calling USAspending.gov.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure: connection refused, TLS, reset, unreadable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("usaspending.gov returned status {status} for {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    /// The request exceeded the configured timeout.
    #[error("Request to {0} timed out")]
    Timeout(String),

    /// The response body was not the JSON we expected.
    #[error("Malformed response body: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration or request parameters.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// Upstream status code, when the failure came from an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when upstream refused the request itself (4xx). The caller has to
    /// change the request; repeating it will not help.
    pub fn is_rejection(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// True when the failure is transient and the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout(_) | Self::Json(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Config(_) | Self::InvalidUrl(_) => false,
        }
    }

    /// Classify a reqwest failure that happened before a status was available.
    pub(crate) fn from_transport(error: reqwest::Error, url: &url::Url) -> Self {
        if error.is_timeout() {
            Self::Timeout(url.to_string())
        } else {
            Self::Http(error)
        }
    }

    /// Create an API error from a status code and response body.
    pub fn from_response(status: u16, url: &url::Url, body: &str) -> Self {
        // USAspending reports validation failures as {"detail": "..."}
        let message = match serde_json::from_str::<ErrorResponse>(body) {
            Ok(ErrorResponse { detail: Some(detail) }) => detail,
            _ => excerpt(body),
        };

        Self::Api {
            status,
            url: url.to_string(),
            message,
        }
    }
}

/// Error body returned by the USAspending API.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<String>,
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.len() <= BODY_EXCERPT_LIMIT {
        return body.to_string();
    }

    let mut end = BODY_EXCERPT_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
