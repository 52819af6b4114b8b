//! Lendmap library entry points.
//!
//! This crate exposes the domain model for shared books and reading records,
//! the record store used to persist them, and the proximity discovery query
//! that finds lendable books near a coordinate. Higher-level consumers (CLI,
//! HTTP service) should only depend on the functions exported here instead of
//! reimplementing behavior.

#![deny(warnings)]

pub mod discovery;
pub mod error;
pub mod geo;
pub mod model;
pub mod store;

pub use discovery::{find_nearby, DEFAULT_RADIUS_KM};
pub use error::{Error, Result};
pub use geo::{haversine_km, Coordinate, EARTH_RADIUS_KM};
pub use model::{Book, NearbyBook, ReadingRecord, ReadingStatus, DISCOVERABLE_STATUSES};
pub use store::{MemoryStore, RecordStore, SqliteStore};
