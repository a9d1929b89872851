//! Boundary between loosely-typed source rows and validated points.
//!
//! Every data source hands over [`RawRow`]s (column name → JSON-like cell).
//! [`parse_row`] turns one row into a [`RawPoint`] or a [`SkipReason`]; the
//! aggregation code never sees an unvalidated row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::geo::{Coordinate, CoordinateError};

/// Column holding the site name.
pub const SITE_NAME_FIELD: &str = "chumsa";
pub const LAT_FIELD: &str = "lat";
pub const LNG_FIELD: &str = "lng";

/// Columns every source must expose.
pub const REQUIRED_COLUMNS: [&str; 3] = [SITE_NAME_FIELD, LAT_FIELD, LNG_FIELD];

/// One untyped record from a data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(BTreeMap<String, Value>);

impl RawRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Trimmed site name, or `None` when the cell is absent, blank or not
    /// text/number.
    #[must_use]
    pub fn site_name(&self) -> Option<String> {
        match self.get(SITE_NAME_FIELD)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_owned())
            }
            // Sheets render purely numeric names as numbers.
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A validated geo-tagged point belonging to a named site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawPoint {
    pub site_name: String,
    pub coordinate: Coordinate,
}

/// Why a row was left out of the aggregation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("missing site name")]
    MissingName,

    #[error("missing `{field}` value")]
    MissingCoordinate { field: &'static str },

    #[error("`{field}` value {value} is not a number")]
    InvalidCoordinate { field: &'static str, value: String },

    #[error("`{field}` value {value} is out of range")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Validate one source row.
///
/// Site names are trimmed; a blank name counts as missing. Coordinates may be
/// JSON numbers or numeric strings.
///
/// # Errors
///
/// Returns the first [`SkipReason`] found, checking the name, then latitude,
/// then longitude.
pub fn parse_row(row: &RawRow) -> Result<RawPoint, SkipReason> {
    let site_name = row.site_name().ok_or(SkipReason::MissingName)?;
    let latitude = coordinate_field(row, LAT_FIELD)?;
    let longitude = coordinate_field(row, LNG_FIELD)?;

    let coordinate = Coordinate::new(latitude, longitude).map_err(|e| match e {
        CoordinateError::Latitude(value) => SkipReason::OutOfRange {
            field: LAT_FIELD,
            value,
        },
        CoordinateError::Longitude(value) => SkipReason::OutOfRange {
            field: LNG_FIELD,
            value,
        },
    })?;

    Ok(RawPoint {
        site_name,
        coordinate,
    })
}

fn coordinate_field(row: &RawRow, field: &'static str) -> Result<f64, SkipReason> {
    let parsed = match row.get(field) {
        None | Some(Value::Null) => return Err(SkipReason::MissingCoordinate { field }),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(SkipReason::MissingCoordinate { field });
            }
            trimmed.parse::<f64>().ok()
        }
        Some(_) => None,
    };

    match parsed {
        Some(value) if value.is_finite() => Ok(value),
        _ => Err(SkipReason::InvalidCoordinate {
            field,
            value: row.get(field).map(ToString::to_string).unwrap_or_default(),
        }),
    }
}
