//! Error types for the plugin.
//!
//! Parsing never produces an error; everything here comes from running the
//! scanner, touching the filesystem, or talking to a collaborator over HTTP.

use thiserror::Error;

/// Errors raised while scanning a file or reporting the result.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The file to scan does not exist.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// A scanner or update binary could not be started.
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A binary exited unsuccessfully without producing any output.
    #[error("{program} exited with {status} and produced no output")]
    CommandFailed { program: String, status: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize results: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The document store answered with a non-success status.
    #[error("document store rejected results with status {status}: {body}")]
    StoreRejected { status: u16, body: String },

    /// `--post` was given but no webhook endpoint is configured.
    #[error("webhook endpoint is not configured (set MALICE_ENDPOINT)")]
    WebhookNotConfigured,
}

impl PluginError {
    pub fn file_not_found(path: &std::path::Path) -> Self {
        Self::FileNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn spawn(program: &std::path::Path, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.display().to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PluginError>;
