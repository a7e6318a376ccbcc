//! Persisting results to the Malice document store.
//!
//! Results are upserted into Elasticsearch under
//! `plugins.<category>.<name>` of the sample's document, so several plugins
//! can contribute to the same document.

use async_trait::async_trait;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{PluginError, Result};
use crate::model::PluginRecord;

const DEFAULT_ELASTICSEARCH_PORT: u16 = 9200;

/// Destination for scan results.
#[async_trait]
pub trait ResultStore: Send + Sync {
    fn name(&self) -> &'static str;
    async fn store(&self, record: &PluginRecord<'_>) -> Result<()>;
}

/// Upserts results into an Elasticsearch index.
pub struct ElasticsearchStore {
    client: reqwest::Client,
    base_url: String,
    index: String,
}

impl ElasticsearchStore {
    pub fn new(address: &str, index: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: elasticsearch_url(address),
            index: index.into(),
        }
    }

    fn update_url(&self, id: &str) -> String {
        format!("{}/{}/_update/{}", self.base_url, self.index, id)
    }
}

#[async_trait]
impl ResultStore for ElasticsearchStore {
    fn name(&self) -> &'static str {
        "Elasticsearch"
    }

    async fn store(&self, record: &PluginRecord<'_>) -> Result<()> {
        let url = self.update_url(&record.id);
        debug!(%url, "upserting results");

        let response = self
            .client
            .post(&url)
            .json(&upsert_body(record)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PluginError::StoreRejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(id = %record.id, index = %self.index, "results stored");
        Ok(())
    }
}

/// Builds the partial document merged into the sample's document.
pub fn upsert_body(record: &PluginRecord<'_>) -> Result<Value> {
    let data = serde_json::to_value(record.data)?;
    Ok(json!({
        "doc": {
            "plugins": {
                record.category: {
                    record.name: data
                }
            }
        },
        "doc_as_upsert": true
    }))
}

/// Turns a bare host name into a URL on the default Elasticsearch port.
pub fn elasticsearch_url(address: &str) -> String {
    let address = address.trim().trim_end_matches('/');
    if address.contains("://") {
        address.to_string()
    } else if address.contains(':') {
        format!("http://{}", address)
    } else {
        format!("http://{}:{}", address, DEFAULT_ELASTICSEARCH_PORT)
    }
}

/// Returns the configured scan ID, or the SHA-256 of the file.
pub fn scan_id(config: &Config, path: &Path) -> Result<String> {
    match &config.scan_id {
        Some(id) => Ok(id.clone()),
        None => sha256_file(path),
    }
}

/// Lowercase hex SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PluginError::file_not_found(path)
        } else {
            PluginError::Io(e)
        }
    })?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
