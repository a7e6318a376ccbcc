//! Configuration file handling.
//!
//! Settings are loaded from a TOML file, then overridden by the `MALICE_*`
//! environment variables, then by command-line flags.
//!
//! # Configuration Location
//!
//! - Linux: `~/.config/fsecure/config.toml`
//! - macOS: `~/Library/Application Support/fsecure/config.toml`
//! - Windows: `%APPDATA%\fsecure\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! build_time = "20170123"
//! sentinel_path = "/opt/malice/UPDATED"
//! index = "malice"
//! elasticsearch = "elasticsearch"
//!
//! [scanner]
//! fsav = "/opt/f-secure/fsav/bin/fsav"
//!
//! [retry]
//! max_attempts = 2
//! delay_ms = 0
//!
//! [webhook]
//! endpoint = "http://malice:8080/results"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::retry::RetryConfig;
use crate::scanner::ScannerPaths;

/// Build time stamped at compile time, `YYYYMMDD`.
pub const BUILD_TIME: &str = match option_env!("FSECURE_BUILD_TIME") {
    Some(value) => value,
    None => "",
};

pub const ENV_SCAN_ID: &str = "MALICE_SCANID";
pub const ENV_ENDPOINT: &str = "MALICE_ENDPOINT";
pub const ENV_PROXY: &str = "MALICE_PROXY";
pub const ENV_ELASTICSEARCH: &str = "MALICE_ELASTICSEARCH";

/// Application configuration.
///
/// Constructed once at startup and passed to every component that needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Plugin build date, used as the update date until `update` has run.
    pub build_time: String,

    /// File recording the date of the last signature update.
    ///
    /// Default: `/opt/malice/UPDATED`
    pub sentinel_path: PathBuf,

    /// Elasticsearch index results are written to.
    ///
    /// Default: `malice`
    pub index: String,

    /// Elasticsearch address. Persistence is skipped when unset.
    pub elasticsearch: Option<String>,

    /// Scan identifier; taken from `MALICE_SCANID`, never from the file.
    #[serde(skip)]
    pub scan_id: Option<String>,

    /// Locations of the F-Secure binaries.
    pub scanner: ScannerPaths,

    /// Retry policy for scanner runs.
    pub retry: RetryConfig,

    /// Webhook settings.
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// URL results are POSTed to.
    pub endpoint: Option<String>,

    /// Proxy used for the webhook when `--proxy` is given.
    pub proxy: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            build_time: BUILD_TIME.to_string(),
            sentinel_path: PathBuf::from("/opt/malice/UPDATED"),
            index: "malice".to_string(),
            elasticsearch: None,
            scan_id: None,
            scanner: ScannerPaths::default(),
            retry: RetryConfig::default(),
            webhook: WebhookConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Applies the `MALICE_*` environment variables.
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`; empty values are ignored.
    pub fn with_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(id) = get(ENV_SCAN_ID) {
            self.scan_id = Some(id);
        }
        if let Some(endpoint) = get(ENV_ENDPOINT) {
            self.webhook.endpoint = Some(endpoint);
        }
        if let Some(proxy) = get(ENV_PROXY) {
            self.webhook.proxy = Some(proxy);
        }
        if let Some(address) = get(ENV_ELASTICSEARCH) {
            self.elasticsearch = Some(address);
        }
        self
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fsecure")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.sentinel_path, PathBuf::from("/opt/malice/UPDATED"));
        assert_eq!(config.index, "malice");
        assert_eq!(config.retry.max_attempts, 2);
        assert!(config.elasticsearch.is_none());
        assert!(config.webhook.endpoint.is_none());
        assert_eq!(config.scanner.fsav, PathBuf::from("/opt/f-secure/fsav/bin/fsav"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_SCAN_ID, "scan-42"),
            (ENV_ENDPOINT, "http://malice:8080/results"),
            (ENV_PROXY, "http://proxy:3128"),
            (ENV_ELASTICSEARCH, ""),
        ]
        .into_iter()
        .collect();

        let config = Config::default().with_env_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.scan_id.as_deref(), Some("scan-42"));
        assert_eq!(config.webhook.endpoint.as_deref(), Some("http://malice:8080/results"));
        assert_eq!(config.webhook.proxy.as_deref(), Some("http://proxy:3128"));
        // empty values leave the setting alone
        assert!(config.elasticsearch.is_none());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            build_time = "20170123"
            elasticsearch = "es.local"

            [retry]
            max_attempts = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.build_time, "20170123");
        assert_eq!(config.elasticsearch.as_deref(), Some("es.local"));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 0);
        assert_eq!(config.index, "malice");
    }

    #[test]
    fn test_default_config_round_trips() {
        let generated = Config::generate_default_config();
        let parsed: Config = toml::from_str(&generated).unwrap();
        assert_eq!(parsed.sentinel_path, Config::default().sentinel_path);
        assert_eq!(parsed.retry, RetryConfig::default());
    }
}
