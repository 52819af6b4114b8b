//! Geographic coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius in kilometres, as used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
///
/// Construction validates the degree ranges, so downstream code can assume a
/// `Coordinate` is always usable for distance computations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting out-of-range or non-finite degrees.
    ///
    /// Latitude must lie in [-90, 90] and longitude in [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(Error::CoordinateOutOfRange {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Great-circle distance between two coordinates in kilometres.
///
/// Uses the haversine formula on a sphere of radius [`EARTH_RADIUS_KM`]:
/// `a = sin²(Δφ/2) + cos φ1 · cos φ2 · sin²(Δλ/2)`,
/// `d = 2R · atan2(√a, √(1−a))`.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    #[test]
    fn test_new_accepts_valid_ranges() {
        assert!(Coordinate::new(0.0, 0.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(Coordinate::new(90.0001, 0.0).is_err());
        assert!(Coordinate::new(-91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, 180.5).is_err());
        assert!(Coordinate::new(0.0, -200.0).is_err());
    }

    #[test]
    fn test_new_rejects_non_finite() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_distance_is_zero_for_identical_points() {
        let a = coord(45.0, 25.0);
        assert_eq!(haversine_km(a, a), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = coord(45.0, 25.0);
        let b = coord(44.4268, 26.1025);
        assert_eq!(haversine_km(a, b), haversine_km(b, a));
    }

    #[test]
    fn test_distance_matches_meridian_arc() {
        // Along a meridian the haversine reduces to R * Δφ exactly.
        let a = coord(45.0, 25.0);
        let b = coord(45.03, 25.0);
        let expected = EARTH_RADIUS_KM * 0.03_f64.to_radians();
        let actual = haversine_km(a, b);
        assert!(((actual - expected) / expected).abs() < 1e-6);
        // Sanity: roughly 3.34 km.
        assert!((actual - 3.34).abs() < 0.01);
    }

    #[test]
    fn test_distance_matches_reference_along_parallel() {
        // Along a parallel the closed form is d = 2R·asin(cos φ · sin(Δλ/2)).
        let a = coord(45.0, 25.0);
        let b = coord(45.0, 25.03);
        let phi = 45.0_f64.to_radians();
        let half_dl = (0.03_f64.to_radians()) / 2.0;
        let expected = 2.0 * EARTH_RADIUS_KM * (phi.cos() * half_dl.sin()).asin();
        let actual = haversine_km(a, b);
        assert!(((actual - expected) / expected).abs() < 1e-6);
    }

    #[test]
    fn test_distance_at_eleven_km() {
        let a = coord(45.0, 25.0);
        let b = coord(45.1, 25.0);
        let actual = haversine_km(a, b);
        assert!((actual - 11.12).abs() < 0.01);
    }
}
