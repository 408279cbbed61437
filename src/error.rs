// src/error.rs

//! Error types for catalog synchronization
//!
//! The variants map onto how a failure is handled by the reconcilers:
//! - `DownloadError`: a remote document could not be fetched (item-level skip
//!   for scoped documents, abort for top-level ones)
//! - `ParseError`: a document does not have the expected shape (abort)
//! - `DataContract`: an upstream record misses a required field (abort the
//!   current package only)
//! - `NotFound`: a referenced category/package/version is not in the mirror
//!   (skip the single record)

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Download error: {0}")]
    DownloadError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Data contract violation: {0}")]
    DataContract(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Whether this failure only concerns a single item of a larger run
    ///
    /// Reconcilers use this to decide between skipping an item and aborting.
    pub fn is_item_level(&self) -> bool {
        matches!(
            self,
            Error::DownloadError(_) | Error::DataContract(_) | Error::NotFound(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_level_classification() {
        assert!(Error::DownloadError("x".into()).is_item_level());
        assert!(Error::DataContract("x".into()).is_item_level());
        assert!(Error::NotFound("x".into()).is_item_level());
        assert!(!Error::ParseError("x".into()).is_item_level());
        assert!(!Error::InitError("x".into()).is_item_level());
    }

    #[test]
    fn test_sqlite_error_converts() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::DatabaseError(_)));
        assert!(err.to_string().starts_with("Database error"));
    }
}
