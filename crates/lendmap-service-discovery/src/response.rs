//! Response wrapper for successful HTTP responses.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Wrapper for successful responses with content type metadata.
///
/// Provides symmetry with `ProblemDetails` by including content type
/// information in the response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    /// The actual response payload, flattened to the top level.
    #[serde(flatten)]
    pub data: T,

    /// Content type for this response.
    pub content_type: String,
}

impl<T> ServiceResponse<T> {
    /// Create a new successful response with the default content type.
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: "application/json".to_string(),
        }
    }
}

impl<T> From<T> for ServiceResponse<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize)]
    struct NearbyResult {
        count: usize,
        titles: Vec<String>,
    }

    #[test]
    fn test_response_flatten_serialization() {
        let result = NearbyResult {
            count: 1,
            titles: vec!["Ion".to_string()],
        };
        let response = ServiceResponse::new(result);
        let json = serde_json::to_string(&response).unwrap();

        // Fields sit at the top level, not nested under "data".
        assert!(json.contains("\"count\":1"));
        assert!(json.contains("\"titles\":["));
        assert!(!json.contains("\"data\":{"));
        assert!(json.contains("\"content_type\":\"application/json\""));
    }
}
