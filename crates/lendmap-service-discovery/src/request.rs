//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use lendmap_lib::DEFAULT_RADIUS_KM;

use crate::ProblemDetails;

/// Upper bound on the requested discovery radius, in kilometres.
const MAX_RADIUS_KM: f64 = 100.0;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Request for finding lendable books near a coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyRequest {
    /// Requester identity; their own records are excluded from results.
    /// May be empty, in which case nothing is excluded.
    #[serde(default)]
    pub requester: String,

    /// Origin latitude in degrees.
    pub latitude: f64,

    /// Origin longitude in degrees.
    pub longitude: f64,

    /// Discovery radius in kilometres.
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
}

fn default_radius_km() -> f64 {
    DEFAULT_RADIUS_KM
}

impl Validate for NearbyRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'latitude' field must be a number between -90 and 90",
                request_id,
            )));
        }

        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'longitude' field must be a number between -180 and 180",
                request_id,
            )));
        }

        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'radius_km' field must be a positive number",
                request_id,
            )));
        }

        if self.radius_km > MAX_RADIUS_KM {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'radius_km' field cannot exceed 100",
                request_id,
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NearbyRequest {
        NearbyRequest {
            requester: "me@example.com".to_string(),
            latitude: 45.0,
            longitude: 25.0,
            radius_km: 5.0,
        }
    }

    #[test]
    fn test_nearby_request_valid() {
        assert!(request().validate("test").is_ok());
    }

    #[test]
    fn test_nearby_request_empty_requester_is_allowed() {
        let mut req = request();
        req.requester = String::new();
        assert!(req.validate("test").is_ok());
    }

    #[test]
    fn test_nearby_request_latitude_out_of_range() {
        let mut req = request();
        req.latitude = 90.5;
        let err = req.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'latitude'"));
    }

    #[test]
    fn test_nearby_request_longitude_out_of_range() {
        let mut req = request();
        req.longitude = -181.0;
        let err = req.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'longitude'"));
    }

    #[test]
    fn test_nearby_request_negative_radius() {
        let mut req = request();
        req.radius_km = -5.0;
        let err = req.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'radius_km'"));
    }

    #[test]
    fn test_nearby_request_radius_too_large() {
        let mut req = request();
        req.radius_km = 100.1;
        let err = req.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("exceed 100"));
    }

    #[test]
    fn test_nearby_request_deserialization_defaults() {
        let json = r#"{"latitude":45.0,"longitude":25.0}"#;
        let req: NearbyRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.radius_km, DEFAULT_RADIUS_KM);
        assert!(req.requester.is_empty());
    }
}
