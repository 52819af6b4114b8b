//! Domain model for shared books and reading records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::Coordinate;

/// Status of a user's association with a book copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadingStatus {
    Reading,
    NotReading,
    ToLend,
    Lent,
}

/// Statuses that make a reading record visible to proximity discovery.
///
/// `Lent` and `NotReading` records never surface, regardless of distance.
/// Kept as a single named constant so the eligibility rule lives in one place.
pub const DISCOVERABLE_STATUSES: [ReadingStatus; 2] =
    [ReadingStatus::Reading, ReadingStatus::ToLend];

impl ReadingStatus {
    /// Whether this status qualifies the record for proximity discovery.
    pub fn is_discoverable(self) -> bool {
        DISCOVERABLE_STATUSES.contains(&self)
    }

    /// Canonical string form, also used as the stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ReadingStatus::Reading => "reading",
            ReadingStatus::NotReading => "notReading",
            ReadingStatus::ToLend => "toLend",
            ReadingStatus::Lent => "lent",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingStatus {
    type Err = Error;

    /// Accepts both the stored camelCase form and the kebab-case CLI form.
    fn from_str(value: &str) -> Result<Self> {
        match value {
            "reading" => Ok(ReadingStatus::Reading),
            "notReading" | "not-reading" => Ok(ReadingStatus::NotReading),
            "toLend" | "to-lend" => Ok(ReadingStatus::ToLend),
            "lent" => Ok(ReadingStatus::Lent),
            _ => Err(Error::UnknownStatus {
                value: value.to_string(),
            }),
        }
    }
}

/// One user's association with one book copy.
///
/// Latitude and longitude are kept as the raw strings the upstream clients
/// recorded; [`ReadingRecord::coordinate`] parses them so a single corrupt
/// record can be skipped without failing a whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    /// Opaque user identifier (an email in practice).
    pub owner: String,
    /// Join key into the book catalog.
    pub isbn: String,
    pub status: ReadingStatus,
    /// Owner's latitude when the record was last updated, in degrees.
    pub latitude: String,
    /// Owner's longitude when the record was last updated, in degrees.
    pub longitude: String,
}

impl ReadingRecord {
    /// Parse and validate the stored location.
    pub fn coordinate(&self) -> Result<Coordinate> {
        let latitude: f64 = self
            .latitude
            .trim()
            .parse()
            .map_err(|_| self.malformed_location())?;
        let longitude: f64 = self
            .longitude
            .trim()
            .parse()
            .map_err(|_| self.malformed_location())?;
        Coordinate::new(latitude, longitude)
    }

    fn malformed_location(&self) -> Error {
        Error::MalformedLocation {
            owner: self.owner.clone(),
            isbn: self.isbn.clone(),
        }
    }
}

/// Catalog entry for a book, keyed by ISBN.
///
/// Created once per unique ISBN the first time any user registers it; the
/// store enforces uniqueness with insert-if-absent semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    /// Publication year, kept as recorded (clients send it as text).
    pub published_year: String,
    pub cover_url: Option<String>,
    pub description: Option<String>,
}

/// A lendable book near the requester: book metadata merged with the owning
/// reading record. Built fresh per discovery request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyBook {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub published_year: String,
    pub cover_url: Option<String>,
    /// Owner identity, exposed so callers can start a conversation.
    pub owner: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: ReadingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(latitude: &str, longitude: &str) -> ReadingRecord {
        ReadingRecord {
            owner: "ana@example.com".to_string(),
            isbn: "9780306406157".to_string(),
            status: ReadingStatus::Reading,
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
        }
    }

    #[test]
    fn test_discoverable_statuses() {
        assert!(ReadingStatus::Reading.is_discoverable());
        assert!(ReadingStatus::ToLend.is_discoverable());
        assert!(!ReadingStatus::NotReading.is_discoverable());
        assert!(!ReadingStatus::Lent.is_discoverable());
    }

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [
            ReadingStatus::Reading,
            ReadingStatus::NotReading,
            ReadingStatus::ToLend,
            ReadingStatus::Lent,
        ] {
            assert_eq!(status.as_str().parse::<ReadingStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_accepts_kebab_case() {
        assert_eq!(
            "to-lend".parse::<ReadingStatus>().unwrap(),
            ReadingStatus::ToLend
        );
        assert_eq!(
            "not-reading".parse::<ReadingStatus>().unwrap(),
            ReadingStatus::NotReading
        );
    }

    #[test]
    fn test_status_rejects_unknown_value() {
        let err = "borrowed".parse::<ReadingStatus>().unwrap_err();
        assert!(err.to_string().contains("borrowed"));
    }

    #[test]
    fn test_status_serde_uses_camel_case() {
        let json = serde_json::to_string(&ReadingStatus::ToLend).unwrap();
        assert_eq!(json, "\"toLend\"");
        let status: ReadingStatus = serde_json::from_str("\"notReading\"").unwrap();
        assert_eq!(status, ReadingStatus::NotReading);
    }

    #[test]
    fn test_record_coordinate_parses_valid_strings() {
        let coordinate = record("45.03", " 25.0 ").coordinate().unwrap();
        assert_eq!(coordinate.latitude, 45.03);
        assert_eq!(coordinate.longitude, 25.0);
    }

    #[test]
    fn test_record_coordinate_rejects_garbage() {
        let err = record("not-a-number", "25.0").coordinate().unwrap_err();
        assert!(err.to_string().contains("ana@example.com"));
    }

    #[test]
    fn test_record_coordinate_rejects_out_of_range() {
        assert!(record("91.0", "25.0").coordinate().is_err());
        assert!(record("45.0", "-181.0").coordinate().is_err());
    }
}
