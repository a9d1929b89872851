//! `check-source`: connectivity and content check for the configured source.

use std::time::Instant;

use anyhow::Context;
use chumsai_core::AppConfig;
use chumsai_source::{summarize_rows, DataSource, SourceSummary};

const TOP_SITES: usize = 10;

pub(crate) async fn run_check_source(config: &AppConfig, sample: usize) -> anyhow::Result<()> {
    let source = DataSource::from_config(config)?;
    println!("fetching rows from {} source", source.kind());
    let started = Instant::now();
    let rows = source
        .fetch_rows()
        .await
        .with_context(|| format!("failed to load rows from {} source", source.kind()))?;
    tracing::info!(
        source = source.kind(),
        rows = rows.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "fetched rows"
    );
    println!("connected");

    let summary = summarize_rows(&rows, TOP_SITES);
    println!("\nrows: {}", summary.row_count);
    if rows.is_empty() {
        return Ok(());
    }

    println!("columns: {}", summary.columns.join(", "));
    if !summary.missing_columns.is_empty() {
        println!(
            "warning: missing columns: {}",
            summary.missing_columns.join(", ")
        );
    }

    println!("\nfirst {} rows:", sample.min(rows.len()));
    for (i, row) in rows.iter().take(sample).enumerate() {
        println!("  {}. {}", i + 1, serde_json::to_string(row)?);
    }

    print_site_summary(&summary);
    Ok(())
}

pub(crate) fn print_site_summary(summary: &SourceSummary) {
    println!("\nsites: {}", summary.site_count);
    if summary.top_sites.is_empty() {
        return;
    }
    println!("top {} sites by point count:", summary.top_sites.len());
    for site in &summary.top_sites {
        println!("  {:>6}  {}", site.points, site.name);
    }
}
