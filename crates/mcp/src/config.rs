use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use usaspending_client::config::default_user_agent;
use usaspending_client::{UsaSpendingClient, DEFAULT_BASE_URL};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// Name advertised to clients in `initialize`
    #[serde(default = "default_server_name")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_server_name() -> String {
    "usaspending".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            name: default_server_name(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        // Load config file if it exists, otherwise use defaults
        if !config_path.exists() {
            tracing::info!(
                path = %config_path.display(),
                "Configuration file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        toml::from_str(&content).context("Failed to parse configuration file")
    }

    /// Build the upstream client described by `[upstream]`.
    pub fn build_client(&self) -> Result<UsaSpendingClient> {
        if self.upstream.timeout_secs == 0 {
            anyhow::bail!("upstream.timeout_secs must be greater than zero");
        }

        UsaSpendingClient::builder()
            .base_url(&self.upstream.base_url)
            .timeout(Duration::from_secs(self.upstream.timeout_secs))
            .user_agent(&self.upstream.user_agent)
            .build()
            .context("Invalid upstream configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::load(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.server.name, "usaspending");
        assert_eq!(config.upstream.base_url, "https://api.usaspending.gov");
        assert_eq!(config.upstream.timeout_secs, 30);
        assert!(config.build_client().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[upstream]\ntimeout_secs = 5").unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        let client = config.build_client().unwrap();

        assert_eq!(config.upstream.base_url, "https://api.usaspending.gov");
        assert_eq!(client.config().timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
name = "spending"

[upstream]
base_url = "http://localhost:9000/proxy/"
timeout_secs = 10
user_agent = "test-agent/1.0"
"#
        )
        .unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        let client = config.build_client().unwrap();

        assert_eq!(config.server.name, "spending");
        assert_eq!(client.config().base_url.as_str(), "http://localhost:9000/proxy/");
        assert_eq!(client.config().user_agent, "test-agent/1.0");
    }

    #[test]
    fn test_invalid_values_fail_at_startup() {
        let config = ServerConfig {
            upstream: UpstreamConfig {
                timeout_secs: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.build_client().is_err());

        let config = ServerConfig {
            upstream: UpstreamConfig {
                base_url: "not a url".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.build_client().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[upstream\nbase_url = ").unwrap();

        assert!(ServerConfig::load(file.path()).is_err());
    }
}
