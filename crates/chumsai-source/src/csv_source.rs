//! Local CSV file source, as written by `chumsai-cli convert`.

use std::io::Read;
use std::path::{Path, PathBuf};

use chumsai_core::RawRow;
use serde_json::Value;

use crate::error::SourceError;

#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// See [`CsvSource::read_rows`]; also [`SourceError::Task`] if the
    /// blocking task panics.
    pub async fn fetch_rows(&self) -> Result<Vec<RawRow>, SourceError> {
        let source = self.clone();
        tokio::task::spawn_blocking(move || source.read_rows()).await?
    }

    /// Reads the file synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] if the file cannot be opened and
    /// [`SourceError::Csv`] if the header row is unreadable.
    pub fn read_rows(&self) -> Result<Vec<RawRow>, SourceError> {
        let file = std::fs::File::open(&self.path).map_err(|e| SourceError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        let rows = rows_from_reader(file)?;
        tracing::debug!(rows = rows.len(), path = %self.path.display(), "read CSV rows");
        Ok(rows)
    }
}

/// Parses header-keyed rows from any CSV reader.
///
/// A leading UTF-8 BOM is ignored. Undecodable records are skipped with a
/// warning; I/O failures abort.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] on I/O failure or an unreadable header.
pub fn rows_from_reader<R: Read>(reader: R) -> Result<Vec<RawRow>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
        .collect();

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(record = line + 1, error = %e, "skipping undecodable CSV record");
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }

        let row: RawRow = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.is_empty())
            .map(|(i, name)| {
                let cell = record.get(i).unwrap_or_default();
                (name.clone(), Value::String(cell.to_owned()))
            })
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_header_keyed_string_cells() {
        let data = "chumsa,lat,lng\nA,18.79,98.99\nB, 18.80 ,98.98\n";
        let rows = rows_from_reader(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("chumsa"), Some(&json!("A")));
        assert_eq!(rows[1].get("lat"), Some(&json!("18.80")));
    }

    #[test]
    fn strips_utf8_bom_from_first_header() {
        let data = "\u{feff}chumsa,lat,lng\nA,18.79,98.99\n";
        let rows = rows_from_reader(data.as_bytes()).unwrap();
        assert_eq!(rows[0].get("chumsa"), Some(&json!("A")));
    }

    #[test]
    fn pads_short_records_and_skips_empty_ones() {
        let data = "chumsa,lat,lng\nA,18.79\n,,\n";
        let rows = rows_from_reader(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("lng"), Some(&json!("")));
    }

    #[test]
    fn keeps_thai_site_names() {
        let data = "chumsa,lat,lng\nชุมสายช้างเผือก,18.80,98.98\n";
        let rows = rows_from_reader(data.as_bytes()).unwrap();
        assert_eq!(rows[0].get("chumsa"), Some(&json!("ชุมสายช้างเผือก")));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let source = CsvSource::new("/definitely/not/here.csv");
        assert!(matches!(source.read_rows(), Err(SourceError::Io { .. })));
    }
}
