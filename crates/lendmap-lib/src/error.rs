use thiserror::Error;

/// Convenient result alias for the lendmap library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The record store could not be reached or queried. Fatal for the whole
    /// discovery call; callers never receive partial results.
    #[error("record store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// Latitude or longitude outside the valid degree ranges (or not finite).
    #[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
    CoordinateOutOfRange { latitude: f64, longitude: f64 },

    /// A stored reading record carries a location that does not parse as
    /// numbers. Confined to one record; discovery skips it.
    #[error("malformed location on reading record {owner}/{isbn}")]
    MalformedLocation { owner: String, isbn: String },

    /// Raised when a reading status string is not one of the known values.
    #[error("unknown reading status: {value}")]
    UnknownStatus { value: String },

    /// Raised when a discovery radius is zero, negative, or not finite.
    #[error("discovery radius must be positive and finite, got {radius_km}")]
    InvalidRadius { radius_km: f64 },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
