use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading site rows from a data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Sheets API answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from Sheets API: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("background read task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
