//! Dataset overview used by the operator CLI.

use std::collections::{BTreeSet, HashMap};

use chumsai_core::points::REQUIRED_COLUMNS;
use chumsai_core::RawRow;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteCount {
    pub name: String,
    pub points: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub row_count: usize,
    pub columns: Vec<String>,
    pub missing_columns: Vec<&'static str>,
    pub site_count: usize,
    /// Largest sites first; equal counts ordered by name.
    pub top_sites: Vec<SiteCount>,
}

/// Counts rows, columns and points per site.
///
/// Site counts use every row with a non-blank name, regardless of whether its
/// coordinates are usable.
#[must_use]
pub fn summarize_rows(rows: &[RawRow], top_n: usize) -> SourceSummary {
    let columns: BTreeSet<&str> = rows.iter().flat_map(RawRow::columns).collect();
    let missing_columns = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !columns.contains(required))
        .collect();

    let mut counts: HashMap<String, usize> = HashMap::new();
    for name in rows.iter().filter_map(RawRow::site_name) {
        *counts.entry(name).or_default() += 1;
    }

    let site_count = counts.len();
    let mut top_sites: Vec<SiteCount> = counts
        .into_iter()
        .map(|(name, points)| SiteCount { name, points })
        .collect();
    top_sites.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.name.cmp(&b.name)));
    top_sites.truncate(top_n);

    SourceSummary {
        row_count: rows.len(),
        columns: columns.into_iter().map(ToOwned::to_owned).collect(),
        missing_columns,
        site_count,
        top_sites,
    }
}
