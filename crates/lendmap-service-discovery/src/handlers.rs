//! Handlers for the discovery endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tracing::{error, info};

use lendmap_lib::{find_nearby, Coordinate, NearbyBook};

use crate::problem::{from_lib_error, ProblemDetails};
use crate::request::{NearbyRequest, Validate};
use crate::response::ServiceResponse;
use crate::state::AppState;

/// Discovery response returned to the caller.
#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    /// The requester identity the query excluded.
    pub requester: String,
    /// Number of lendable books found.
    pub count: usize,
    /// Matching books, in record-store order.
    pub nearby: Vec<NearbyBook>,
}

/// HTTP response - either success or RFC 9457 error.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Response {
    Success(ServiceResponse<NearbyResponse>),
    Error(ProblemDetails),
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        match self {
            Response::Success(data) => (StatusCode::OK, Json(data)).into_response(),
            Response::Error(problem) => problem.into_response(),
        }
    }
}

/// Handle POST /api/v1/discovery/nearby requests.
pub async fn nearby_handler(
    State(state): State<AppState>,
    Json(request): Json<NearbyRequest>,
) -> impl IntoResponse {
    let request_id = generate_request_id();

    info!(
        request_id = %request_id,
        requester = %request.requester,
        latitude = request.latitude,
        longitude = request.longitude,
        radius_km = request.radius_km,
        "handling nearby discovery request"
    );

    if let Err(problem) = request.validate(&request_id) {
        return Response::Error(*problem);
    }

    let origin = match Coordinate::new(request.latitude, request.longitude) {
        Ok(origin) => origin,
        Err(error) => {
            return Response::Error(ProblemDetails::bad_request(error.to_string(), &request_id));
        }
    };

    match find_nearby(state.store(), origin, &request.requester, request.radius_km) {
        Ok(nearby) => {
            info!(
                request_id = %request_id,
                requester = %request.requester,
                found = nearby.len(),
                "nearby discovery completed"
            );
            Response::Success(ServiceResponse::new(NearbyResponse {
                requester: request.requester,
                count: nearby.len(),
                nearby,
            }))
        }
        Err(lib_error) => {
            error!(
                request_id = %request_id,
                error = %lib_error,
                "nearby discovery failed"
            );
            Response::Error(from_lib_error(&lib_error, &request_id))
        }
    }
}

/// Generate a unique request ID for tracing.
fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    format!("req-{:x}", timestamp)
}
