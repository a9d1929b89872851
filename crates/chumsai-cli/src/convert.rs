//! `convert`: turns the first worksheet of an Excel file into a CSV that
//! Google Sheets (or the CSV source) can import.
//!
//! The CSV starts with a UTF-8 BOM so spreadsheet tools detect the encoding
//! of Thai site names.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use calamine::{open_workbook_auto, Data, Reader};
use chumsai_core::points::{REQUIRED_COLUMNS, SITE_NAME_FIELD};
use chumsai_core::RawRow;
use chumsai_source::summarize_rows;

use crate::check::print_site_summary;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const PREVIEW_ROWS: usize = 5;
const TOP_SITES: usize = 10;

/// A header row plus data rows, all rendered as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// First row becomes the header. Blank rows are dropped and every row is
    /// padded or cut to the header width.
    pub(crate) fn from_grid(grid: Vec<Vec<String>>) -> Self {
        let mut grid = grid.into_iter();
        let headers: Vec<String> = grid
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|h| h.trim().to_owned())
            .collect();
        let width = headers.len();

        let (rows, blank): (Vec<_>, Vec<_>) =
            grid.partition(|row| row.iter().any(|cell| !cell.trim().is_empty()));
        if !blank.is_empty() {
            tracing::debug!(blank_rows = blank.len(), "dropped blank worksheet rows");
        }
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Self { headers, rows }
    }

    pub(crate) fn missing_columns(&self) -> Vec<&'static str> {
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|required| !self.headers.iter().any(|h| h == required))
            .collect()
    }

    pub(crate) fn to_raw_rows(&self) -> Vec<RawRow> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .zip(row)
                    .filter(|(header, _)| !header.is_empty())
                    .map(|(header, cell)| (header.as_str(), cell.as_str()))
                    .collect()
            })
            .collect()
    }

    /// Writes the BOM, the header and every row.
    pub(crate) fn write_csv<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        writer.write_all(UTF8_BOM)?;
        let mut csv = csv::WriterBuilder::new().from_writer(writer);
        csv.write_record(&self.headers)?;
        for row in &self.rows {
            csv.write_record(row)?;
        }
        csv.flush()?;
        Ok(())
    }
}

pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_owned(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Reads the first worksheet of any workbook format calamine supports.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, has no sheets, or the
/// first sheet cannot be read.
pub(crate) fn read_first_sheet(path: &Path) -> anyhow::Result<Table> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open Excel file {}", path.display()))?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("workbook contains no sheets")?;
    let range = workbook
        .worksheet_range(&first)
        .with_context(|| format!("failed to read sheet '{first}'"))?;

    let grid = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    Ok(Table::from_grid(grid))
}

pub(crate) fn run_convert(excel: &Path, output: &Path) -> anyhow::Result<()> {
    println!("reading {}", excel.display());
    let table = read_first_sheet(excel)?;

    println!("rows: {}", table.rows.len());
    println!("columns: {}", table.headers.join(", "));
    let missing = table.missing_columns();
    if missing.is_empty() {
        println!("required columns present: {}", REQUIRED_COLUMNS.join(", "));
    } else {
        println!("warning: missing columns: {}", missing.join(", "));
    }

    let file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    table.write_csv(BufWriter::new(file))?;
    println!("\nwrote {}", output.display());

    println!("\nfirst {PREVIEW_ROWS} rows:");
    println!("  {}", table.headers.join(" | "));
    for row in table.rows.iter().take(PREVIEW_ROWS) {
        println!("  {}", row.join(" | "));
    }

    if !missing.contains(&SITE_NAME_FIELD) {
        let summary = summarize_rows(&table.to_raw_rows(), TOP_SITES);
        print_site_summary(&summary);
    }

    println!("\nimport {} into Google Sheets:", output.display());
    println!("  1. open the target spreadsheet");
    println!("  2. File > Import > Upload");
    println!("  3. choose {}", output.display());
    println!("  4. Import location: Replace spreadsheet");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| (*c).to_string()).collect())
            .collect()
    }

    #[test]
    fn from_grid_pads_rows_and_drops_blank_ones() {
        let table = Table::from_grid(grid(&[
            &[" chumsa ", "lat", "lng"],
            &["A", "18.79"],
            &["", " ", ""],
            &["B", "18.80", "98.98", "extra"],
        ]));

        assert_eq!(table.headers, ["chumsa", "lat", "lng"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], ["A", "18.79", ""]);
        assert_eq!(table.rows[1], ["B", "18.80", "98.98"]);
    }

    #[test]
    fn missing_columns_lists_absent_required_headers() {
        let table = Table::from_grid(grid(&[&["chumsa", "latitude", "lng"]]));
        assert_eq!(table.missing_columns(), ["lat"]);
    }

    #[test]
    fn write_csv_prefixes_bom() {
        let table = Table::from_grid(grid(&[
            &["chumsa", "lat", "lng"],
            &["ชุมสาย, เมือง", "18.79", "98.99"],
        ]));
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();

        assert!(out.starts_with(UTF8_BOM));
        let text = String::from_utf8(out[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text, "chumsa,lat,lng\n\"ชุมสาย, เมือง\",18.79,98.99\n");
    }

    #[test]
    fn written_csv_reads_back_through_csv_source() {
        let table = Table::from_grid(grid(&[
            &["chumsa", "lat", "lng"],
            &["ชุมสายช้างเผือก", "18.8", "98.98"],
        ]));
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();

        let rows = chumsai_source::rows_from_reader(out.as_slice()).unwrap();
        assert_eq!(rows, table.to_raw_rows());
    }

    #[test]
    fn cell_text_renders_numbers_plainly() {
        assert_eq!(cell_text(&Data::Float(18.7883)), "18.7883");
        assert_eq!(cell_text(&Data::Float(5.0)), "5");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::String(" A ".to_string())), "A");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn read_first_sheet_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_first_sheet(&dir.path().join("absent.xlsx")).unwrap_err();
        assert!(err.to_string().contains("failed to open Excel file"));
    }
}
