//! Great-circle distance on a spherical Earth.
//!
//! Angles are taken in degrees and converted to radians internally. The
//! haversine term is clamped to `[0, 1]` so floating-point noise near
//! antipodal points never pushes `asin` outside its domain.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius used for every distance in the crate.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct UncheckedCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<UncheckedCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: UncheckedCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} is not a finite value in [-90, 90]")]
    Latitude(f64),

    #[error("longitude {0} is not a finite value in [-180, 180]")]
    Longitude(f64),
}

impl Coordinate {
    /// Builds a coordinate, rejecting NaN, infinities and out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] naming the offending component.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude(self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in kilometres.
    #[must_use]
    pub fn distance_km(self, other: Coordinate) -> f64 {
        distance_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Haversine distance in kilometres between two points given in degrees.
///
/// Inputs are not validated; callers pass finite coordinates (see
/// [`Coordinate::new`]).
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    const CHIANG_MAI: (f64, f64) = (18.7883, 98.9853);

    #[test]
    fn identical_points_are_zero_apart() {
        for (lat, lng) in [CHIANG_MAI, (0.0, 0.0), (-89.9, 179.9), (45.5, -120.25)] {
            assert!(distance_km(lat, lng, lat, lng).abs() < 1e-9);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (CHIANG_MAI, (18.95, 99.10)),
            ((13.7563, 100.5018), (51.5074, -0.1278)),
            ((-33.8688, 151.2093), (40.7128, -74.0060)),
        ];
        for ((a, b), (c, d)) in pairs {
            let forward = distance_km(a, b, c, d);
            let backward = distance_km(c, d, a, b);
            assert!(
                (forward - backward).abs() < 1e-9,
                "{forward} != {backward} for ({a},{b})-({c},{d})"
            );
        }
    }

    #[test]
    fn antipodal_points_are_half_the_circumference_apart() {
        let d = distance_km(0.0, 0.0, 0.0, 180.0);
        assert!((d - PI * EARTH_RADIUS_KM).abs() < 1e-6, "got {d}");

        let poles = distance_km(90.0, 0.0, -90.0, 0.0);
        assert!((poles - PI * EARTH_RADIUS_KM).abs() < 1e-6, "got {poles}");
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.195).abs() < 0.01, "got {d}");
    }

    #[test]
    fn bangkok_to_chiang_mai_matches_known_distance() {
        let d = distance_km(13.7563, 100.5018, CHIANG_MAI.0, CHIANG_MAI.1);
        assert!((575.0..595.0).contains(&d), "got {d}");
    }

    #[test]
    fn coordinate_rejects_out_of_range_and_nan() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(CoordinateError::Latitude(90.5))
        );
        assert_eq!(
            Coordinate::new(0.0, -180.5),
            Err(CoordinateError::Longitude(-180.5))
        );
        assert!(matches!(
            Coordinate::new(f64::NAN, 0.0),
            Err(CoordinateError::Latitude(_))
        ));
        assert!(matches!(
            Coordinate::new(0.0, f64::INFINITY),
            Err(CoordinateError::Longitude(_))
        ));
    }

    #[test]
    fn coordinate_accepts_boundaries() {
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
    }

    #[test]
    fn deserializing_validates_like_new() {
        let ok: Coordinate =
            serde_json::from_value(serde_json::json!({"latitude": 18.79, "longitude": 98.98}))
                .unwrap();
        assert_eq!(ok, Coordinate::new(18.79, 98.98).unwrap());

        let err = serde_json::from_value::<Coordinate>(
            serde_json::json!({"latitude": 500.0, "longitude": -999.0}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("latitude 500"), "{err}");

        assert!(serde_json::from_value::<Coordinate>(
            serde_json::json!({"latitude": 0.0, "longitude": 180.5})
        )
        .is_err());
    }

    #[test]
    fn coordinate_distance_delegates_to_haversine() {
        let a = Coordinate::new(CHIANG_MAI.0, CHIANG_MAI.1).unwrap();
        let b = Coordinate::new(18.80, 98.98).unwrap();
        assert!(
            (a.distance_km(b) - distance_km(CHIANG_MAI.0, CHIANG_MAI.1, 18.80, 98.98)).abs()
                < 1e-12
        );
    }
}
