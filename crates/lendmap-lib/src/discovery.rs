//! Proximity discovery: find other users' lendable books near a coordinate.
//!
//! A single-shot, read-only query: list everyone else's reading records,
//! keep the discoverable ones within the radius, then join the retained
//! records against the book catalog in one batch lookup. Failures confined
//! to one record (malformed location, dangling ISBN) skip that record only;
//! a store failure fails the whole call so an empty result always means
//! "no books nearby" rather than "could not check".

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geo::{haversine_km, Coordinate};
use crate::model::{NearbyBook, ReadingRecord};
use crate::store::RecordStore;

/// Default discovery radius in kilometres.
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Find lendable books within `radius_km` of `origin`, excluding records
/// owned by `requester`.
///
/// The requester identity is only an exclusion key; an empty string excludes
/// nothing. Results preserve the record order returned by the store, and the
/// boundary is inclusive: a record exactly `radius_km` away is kept.
pub fn find_nearby(
    store: &dyn RecordStore,
    origin: Coordinate,
    requester: &str,
    radius_km: f64,
) -> Result<Vec<NearbyBook>> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(Error::InvalidRadius { radius_km });
    }

    let candidates = store.readings_excluding(requester)?;
    let mut retained: Vec<(ReadingRecord, Coordinate)> = Vec::new();

    for record in candidates {
        if !record.status.is_discoverable() {
            continue;
        }
        let location = match record.coordinate() {
            Ok(location) => location,
            Err(error) => {
                warn!(
                    owner = %record.owner,
                    isbn = %record.isbn,
                    %error,
                    "skipping reading record with malformed location"
                );
                continue;
            }
        };
        if haversine_km(origin, location) <= radius_km {
            retained.push((record, location));
        }
    }

    // One batched catalog lookup for all retained records, merged back in
    // record order.
    let isbns: Vec<&str> = retained.iter().map(|(record, _)| record.isbn.as_str()).collect();
    let books = store.books_by_isbns(&isbns)?;

    let mut nearby = Vec::with_capacity(retained.len());
    for (record, location) in retained {
        let Some(book) = books.get(&record.isbn) else {
            warn!(
                owner = %record.owner,
                isbn = %record.isbn,
                "reading record references an uncataloged book, dropping"
            );
            continue;
        };
        nearby.push(NearbyBook {
            isbn: book.isbn.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            publisher: book.publisher.clone(),
            published_year: book.published_year.clone(),
            cover_url: book.cover_url.clone(),
            owner: record.owner,
            latitude: location.latitude,
            longitude: location.longitude,
            status: record.status,
        });
    }

    debug!(requester, radius_km, found = nearby.len(), "discovery completed");
    Ok(nearby)
}
