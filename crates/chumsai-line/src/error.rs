use thiserror::Error;

#[derive(Debug, Error)]
pub enum LineError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from LINE API: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
