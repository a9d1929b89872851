//! Loaders for the site table: Google Sheets or a local CSV file.

pub mod csv_source;
pub mod error;
pub mod sheets;
pub mod summary;

use chumsai_core::{AppConfig, RawRow, SourceConfig};

pub use csv_source::{rows_from_reader, CsvSource};
pub use error::SourceError;
pub use sheets::{records_from_values, SheetsClient};
pub use summary::{summarize_rows, SiteCount, SourceSummary};

/// The configured row source.
#[derive(Debug, Clone)]
pub enum DataSource {
    Sheets(SheetsClient),
    Csv(CsvSource),
}

impl DataSource {
    /// Builds the source selected by `CHUMSAI_SOURCE`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the Sheets HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        match &config.source {
            SourceConfig::Sheets {
                sheet_id,
                range,
                credential,
            } => Ok(Self::Sheets(SheetsClient::new(
                sheet_id,
                range,
                credential.clone(),
                config.http_timeout_secs,
                &config.user_agent,
            )?)),
            SourceConfig::Csv { path } => Ok(Self::Csv(CsvSource::new(path.clone()))),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sheets(_) => "sheets",
            Self::Csv(_) => "csv",
        }
    }

    /// # Errors
    ///
    /// Propagates the error of the underlying source.
    pub async fn fetch_rows(&self) -> Result<Vec<RawRow>, SourceError> {
        match self {
            Self::Sheets(client) => client.fetch_rows().await,
            Self::Csv(source) => source.fetch_rows().await,
        }
    }
}

/// Fetches rows, logging and swallowing any failure.
///
/// The webhook treats an unreachable source like an empty one so the user
/// still gets a "nothing nearby" reply.
pub async fn fetch_rows_or_empty(source: &DataSource) -> Vec<RawRow> {
    match source.fetch_rows().await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(source = source.kind(), error = %e, "failed to load site rows");
            Vec::new()
        }
    }
}
