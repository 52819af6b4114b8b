//! Lendmap proximity discovery HTTP microservice.
//!
//! # Configuration
//!
//! - `LENDMAP_DATA_PATH` - Path to the SQLite record store (default: /data/lendmap.db)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - `json` (default) or `text`

use std::env;
use std::net::SocketAddr;

use tracing::{error, info};

use lendmap_service_discovery::{app, init_logging, AppState, LoggingConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LoggingConfig::from_env());

    let data_path =
        env::var("LENDMAP_DATA_PATH").unwrap_or_else(|_| "/data/lendmap.db".to_string());
    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    info!(data_path = %data_path, port = port, "starting discovery service");

    let state = AppState::load(&data_path).map_err(|e| {
        error!(error = %e, path = %data_path, "failed to load application state");
        e
    })?;

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
