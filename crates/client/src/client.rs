//! Main client for the USAspending API.

use crate::api::{AgenciesApi, AwardsApi, SearchApi};
use crate::config::{default_user_agent, ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::error::{ClientError, ClientResult};
use crate::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Client for the USAspending.gov API. Cheap to clone; clones share one
/// connection pool.
#[derive(Debug, Clone)]
pub struct UsaSpendingClient {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
}

impl UsaSpendingClient {
    /// Create a new client builder.
    pub fn builder() -> UsaSpendingClientBuilder {
        UsaSpendingClientBuilder::new()
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the agencies API.
    pub fn agencies(&self) -> AgenciesApi<'_> {
        AgenciesApi::new(self)
    }

    /// Get the awards API.
    pub fn awards(&self) -> AwardsApi<'_> {
        AwardsApi::new(self)
    }

    /// Get the search API.
    pub fn search(&self) -> SearchApi<'_> {
        SearchApi::new(self)
    }
}

/// Builder for creating a UsaSpendingClient.
pub struct UsaSpendingClientBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl UsaSpendingClientBuilder {
    /// Create a new builder pointed at the public API.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }

    /// Set the base URL of the upstream API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client.
    pub fn build(self) -> ClientResult<UsaSpendingClient> {
        let base_url = Url::parse(&self.base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "Base URL must be http or https, got: {}",
                base_url.scheme()
            )));
        }
        if self.timeout.is_zero() {
            return Err(ClientError::Config("timeout must be non-zero".to_string()));
        }

        let config = ClientConfig {
            base_url,
            timeout: self.timeout,
            user_agent: self.user_agent,
        };

        UsaSpendingClient::from_config(config)
    }
}

impl Default for UsaSpendingClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
