//! Posting results to the Malice webhook.

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::WebhookConfig;
use crate::error::{PluginError, Result};

/// Header naming the scanned file.
pub const TASK_HEADER: &str = "Task";

pub struct Webhook {
    client: reqwest::Client,
    endpoint: String,
}

impl Webhook {
    /// Builds a webhook client, routed through the configured proxy when
    /// `use_proxy` is set.
    pub fn new(config: &WebhookConfig, use_proxy: bool) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or(PluginError::WebhookNotConfigured)?;

        let mut builder = reqwest::Client::builder();
        if use_proxy {
            match &config.proxy {
                Some(proxy) => {
                    debug!(%proxy, "using proxy for webhook");
                    builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
                }
                None => warn!("--proxy given but MALICE_PROXY is not set"),
            }
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POSTs the JSON `body`, tagged with the scanned file's path.
    pub async fn post(&self, task: &Path, body: String) -> Result<StatusCode> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(TASK_HEADER, task.display().to_string())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        Ok(response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_endpoint() {
        let err = Webhook::new(&WebhookConfig::default(), false).err().unwrap();
        assert!(matches!(err, PluginError::WebhookNotConfigured));
    }

    #[test]
    fn test_builds_with_proxy() {
        let config = WebhookConfig {
            endpoint: Some("http://malice:8080/results".to_string()),
            proxy: Some("http://proxy:3128".to_string()),
        };
        let webhook = Webhook::new(&config, true).unwrap();
        assert_eq!(webhook.endpoint(), "http://malice:8080/results");
    }

    #[test]
    fn test_proxy_flag_without_proxy_url() {
        let config = WebhookConfig {
            endpoint: Some("http://malice:8080/results".to_string()),
            proxy: None,
        };
        assert!(Webhook::new(&config, true).is_ok());
    }

    #[test]
    fn test_invalid_proxy_is_rejected() {
        let config = WebhookConfig {
            endpoint: Some("http://malice:8080/results".to_string()),
            proxy: Some("not a url".to_string()),
        };
        assert!(matches!(Webhook::new(&config, true), Err(PluginError::Http(_))));
    }
}
