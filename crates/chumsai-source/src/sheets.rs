//! Read-only client for the Google Sheets v4 `values.get` endpoint.
//!
//! The first row of the range is treated as the header; every following
//! non-blank row becomes a [`RawRow`] keyed by header name.

use std::time::Duration;

use chumsai_core::{RawRow, SheetsCredential};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::error::SourceError;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Client bound to one spreadsheet range.
///
/// Use [`SheetsClient::new`] for production or [`SheetsClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: Url,
    sheet_id: String,
    range: String,
    credential: SheetsCredential,
}

impl SheetsClient {
    /// Creates a client pointed at the production Sheets API.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        sheet_id: &str,
        range: &str,
        credential: SheetsCredential,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SourceError> {
        Self::with_base_url(
            sheet_id,
            range,
            credential,
            timeout_secs,
            user_agent,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built, or
    /// [`SourceError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        sheet_id: &str,
        range: &str,
        credential: SheetsCredential,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| SourceError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(SourceError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            sheet_id: sheet_id.to_owned(),
            range: range.to_owned(),
            credential,
        })
    }

    /// Fetches the configured range and converts it to header-keyed rows.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Http`] on network failure.
    /// - [`SourceError::UnexpectedStatus`] on a non-2xx response.
    /// - [`SourceError::Deserialize`] if the body is not a `ValueRange`.
    pub async fn fetch_rows(&self) -> Result<Vec<RawRow>, SourceError> {
        let url = self.values_url();
        let mut request = self.client.get(url.clone());
        if let SheetsCredential::AccessToken(token) = &self.credential {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let range: ValueRange =
            serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
                context: format!("values.get(sheet={}, range={})", self.sheet_id, self.range),
                source: e,
            })?;

        let rows = records_from_values(range.values);
        tracing::debug!(rows = rows.len(), sheet = %self.sheet_id, "fetched sheet rows");
        Ok(rows)
    }

    /// Builds the `values.get` URL with the range as an encoded path segment.
    fn values_url(&self) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "v4",
                "spreadsheets",
                self.sheet_id.as_str(),
                "values",
                self.range.as_str(),
            ]);
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("valueRenderOption", "UNFORMATTED_VALUE");
            pairs.append_pair("majorDimension", "ROWS");
            if let SheetsCredential::ApiKey(key) = &self.credential {
                pairs.append_pair("key", key);
            }
        }
        url
    }
}

/// Turns a header row plus data rows into header-keyed records.
///
/// Short rows are padded with empty strings, blank header cells are ignored
/// and rows with no non-empty cell are dropped.
#[must_use]
pub fn records_from_values(values: Vec<Vec<Value>>) -> Vec<RawRow> {
    let mut rows = values.into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let header: Vec<String> = header.iter().map(header_name).collect();

    rows.filter(|cells| cells.iter().any(|cell| !is_blank(cell)))
        .map(|cells| {
            header
                .iter()
                .enumerate()
                .filter(|(_, name)| !name.is_empty())
                .map(|(i, name)| {
                    let cell = cells
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| Value::String(String::new()));
                    (name.clone(), cell)
                })
                .collect()
        })
        .collect()
}

fn header_name(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.trim().to_owned(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_blank(cell: &Value) -> bool {
    match cell {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
