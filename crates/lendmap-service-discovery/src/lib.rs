//! Lendmap proximity discovery HTTP microservice.
//!
//! Thin HTTP glue over `lendmap-lib`: handlers parse and validate request
//! JSON, call the library, and format either a success payload or an RFC 9457
//! problem response.
//!
//! # Endpoints
//!
//! - `POST /api/v1/discovery/nearby` - Find lendable books near a coordinate
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe (checks the record store answers)

#![deny(warnings)]

mod handlers;
mod health;
pub mod logging;
mod problem;
mod request;
mod response;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::nearby_handler;
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_SERVICE_UNAVAILABLE,
};
pub use request::{NearbyRequest, Validate};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError};

/// Build the service router with all routes and middleware attached.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/discovery/nearby", post(nearby_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
