//! `nearby`: runs the site search from the command line.

use std::fmt::Write as _;
use std::time::Instant;

use anyhow::Context;
use chumsai_core::{find_nearby_with_stats, AppConfig, Coordinate, SearchParams, SiteAggregate};
use chumsai_source::DataSource;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NearbyRequest {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<f64>,
    pub max_results: Option<usize>,
    pub json: bool,
}

impl NearbyRequest {
    /// Command-line overrides win over the configured defaults.
    pub(crate) fn params(&self, defaults: SearchParams) -> anyhow::Result<SearchParams> {
        Ok(SearchParams::new(
            self.radius_km.unwrap_or(defaults.radius_km),
            self.max_results.unwrap_or(defaults.max_results),
        )?)
    }
}

/// Unlike the webhook, a failing source is reported instead of treated as
/// empty.
pub(crate) async fn run_nearby(config: &AppConfig, request: &NearbyRequest) -> anyhow::Result<()> {
    let params = request.params(config.search)?;
    let user = Coordinate::new(request.lat, request.lng)?;

    let source = DataSource::from_config(config)?;
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
    let outcome = find_nearby_with_stats(user, &rows, &params)?;

    if request.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!(
        "{} rows used, {} skipped; radius {} km",
        outcome.rows_used, outcome.rows_skipped, params.radius_km
    );
    if outcome.sites.is_empty() {
        println!("no sites within {} km", params.radius_km);
    } else {
        print!("{}", format_table(&outcome.sites));
    }
    Ok(())
}

pub(crate) fn format_table(sites: &[SiteAggregate]) -> String {
    let mut out = format!("{:<6}{:>12}{:>8}  SITE\n", "RANK", "DIST (KM)", "POINTS");
    for (rank, site) in sites.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<6}{:>12.2}{:>8}  {}",
            rank + 1,
            site.min_distance_km,
            site.point_count,
            site.name
        );
    }
    out
}
