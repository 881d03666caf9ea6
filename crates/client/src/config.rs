//! Configuration types for the USAspending client.

use std::time::Duration;
use url::Url;

/// Public USAspending.gov API host.
pub const DEFAULT_BASE_URL: &str = "https://api.usaspending.gov";

/// Default bound on a single outbound request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the USAspending client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the upstream API. Endpoint paths are appended to it.
    pub base_url: Url,
    /// Timeout applied to each request, connect through body.
    pub timeout: Duration,
    /// `User-Agent` header sent upstream.
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }
}

pub fn default_user_agent() -> String {
    format!("usaspending-mcp/{}", env!("CARGO_PKG_VERSION"))
}
