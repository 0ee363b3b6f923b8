//! Error types for loading and exporting flight data.
//!
//! The aggregation functions never fail; errors only come from the edges of
//! the crate: reading or fetching the CSV resource, and writing exports.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for jetstats operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read the flight data file.
    #[error("failed to read flight data from {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to fetch the flight data over HTTP.
    #[error("failed to fetch flight data from {url}: {source}")]
    Fetch {
        /// URL that was requested.
        url: String,
        /// The underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The CSV header has no column that can identify an aircraft.
    #[error("flight data has no registration or icao column (found: {headers})")]
    MissingKeyColumn {
        /// The header row as read.
        headers: String,
    },

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for jetstats operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_column_display() {
        let err = Error::MissingKeyColumn {
            headers: "date,type".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("registration or icao"));
        assert!(msg.contains("date,type"));
    }

    #[test]
    fn test_read_error_display() {
        let err = Error::Read {
            path: PathBuf::from("data/missing.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("data/missing.csv"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
