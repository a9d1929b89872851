//! Nearest-site search.
//!
//! Rows are validated one by one, grouped by site name, and each site keeps
//! its point count and the smallest distance from any of its points to the
//! user. Sites farther than the radius are dropped, the rest are sorted by
//! that distance and cut to the requested number of results.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::geo::{Coordinate, CoordinateError};
use crate::points::{parse_row, RawPoint, RawRow};

pub const SEARCH_RADIUS_KM: f64 = 5.0;
pub const MAX_RESULTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchParams {
    pub radius_km: f64,
    pub max_results: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            radius_km: SEARCH_RADIUS_KM,
            max_results: MAX_RESULTS,
        }
    }
}

impl SearchParams {
    /// # Errors
    ///
    /// Returns [`NearbyError::InvalidParams`] when the radius is not a
    /// positive finite number or `max_results` is zero.
    pub fn new(radius_km: f64, max_results: usize) -> Result<Self, NearbyError> {
        let params = Self {
            radius_km,
            max_results,
        };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<(), NearbyError> {
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(NearbyError::InvalidParams(format!(
                "radius_km must be a positive number, got {}",
                self.radius_km
            )));
        }
        if self.max_results == 0 {
            return Err(NearbyError::InvalidParams(
                "max_results must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-site summary relative to the user's position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteAggregate {
    pub name: String,
    /// Valid points of this site in the source, whether nearby or not.
    pub point_count: usize,
    pub min_distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NearbyError {
    #[error("invalid user coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),

    #[error("invalid search parameters: {0}")]
    InvalidParams(String),
}

/// Ranked sites plus how many source rows were used or skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub sites: Vec<SiteAggregate>,
    pub rows_used: usize,
    pub rows_skipped: usize,
}

/// Rank the sites near `user` from raw source rows.
///
/// Rows that fail validation are skipped and logged at `debug`; they never
/// fail the call. An empty `rows` slice yields an empty result.
///
/// # Errors
///
/// Returns [`NearbyError::InvalidParams`] for an unusable `params`.
pub fn find_nearby(
    user: Coordinate,
    rows: &[RawRow],
    params: &SearchParams,
) -> Result<Vec<SiteAggregate>, NearbyError> {
    find_nearby_with_stats(user, rows, params).map(|outcome| outcome.sites)
}

/// Same as [`find_nearby`], also reporting row usage.
///
/// # Errors
///
/// Returns [`NearbyError::InvalidParams`] for an unusable `params`.
pub fn find_nearby_with_stats(
    user: Coordinate,
    rows: &[RawRow],
    params: &SearchParams,
) -> Result<SearchOutcome, NearbyError> {
    params.validate()?;

    let mut rows_skipped = 0;
    let points: Vec<RawPoint> = rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| match parse_row(row) {
            Ok(point) => Some(point),
            Err(reason) => {
                rows_skipped += 1;
                tracing::debug!(row = index, %reason, "skipping source row");
                None
            }
        })
        .collect();
    let rows_used = points.len();

    let sites = rank(user, points, params);
    tracing::info!(
        sites = sites.len(),
        rows_used,
        rows_skipped,
        radius_km = params.radius_km,
        "nearby search complete"
    );

    Ok(SearchOutcome {
        sites,
        rows_used,
        rows_skipped,
    })
}

/// Rank already-validated points.
///
/// # Errors
///
/// Returns [`NearbyError::InvalidParams`] for an unusable `params`.
pub fn rank_points<I>(
    user: Coordinate,
    points: I,
    params: &SearchParams,
) -> Result<Vec<SiteAggregate>, NearbyError>
where
    I: IntoIterator<Item = RawPoint>,
{
    params.validate()?;
    Ok(rank(user, points, params))
}

fn rank<I>(user: Coordinate, points: I, params: &SearchParams) -> Vec<SiteAggregate>
where
    I: IntoIterator<Item = RawPoint>,
{
    // Vec keeps first-seen order so equal distances sort stably.
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut sites: Vec<SiteAggregate> = Vec::new();

    for point in points {
        let distance = user.distance_km(point.coordinate);
        let slot = *slots.entry(point.site_name).or_insert_with_key(|name| {
            sites.push(SiteAggregate {
                name: name.clone(),
                point_count: 0,
                min_distance_km: f64::INFINITY,
            });
            sites.len() - 1
        });

        let site = &mut sites[slot];
        site.point_count += 1;
        if distance < site.min_distance_km {
            site.min_distance_km = distance;
        }
    }

    sites.retain(|site| site.min_distance_km <= params.radius_km);
    sites.sort_by(|a, b| a.min_distance_km.total_cmp(&b.min_distance_km));
    sites.truncate(params.max_results);
    sites
}

#[cfg(test)]
#[path = "nearby_test.rs"]
mod tests;
