//! Unified error types for aetherforge.

use tokio_rusqlite::rusqlite;

/// Unified error types shared by the cache, fetcher, and extractor.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Content extraction failed.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Cache directory could not be created.
    #[error("CACHE_ERROR: {0}")]
    Io(#[from] std::io::Error),

    /// Stored meta column could not be encoded or decoded.
    #[error("CACHE_ERROR: invalid meta: {0}")]
    InvalidMeta(#[from] serde_json::Error),

    /// HTTP client could not be built or a request failed.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ExtractFailed("no body".to_string());
        assert!(err.to_string().contains("EXTRACT_FAILED"));
        assert!(err.to_string().contains("no body"));
    }

    #[test]
    fn test_rusqlite_error_maps_to_database() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Database(_)));
        assert!(err.to_string().starts_with("CACHE_ERROR"));
    }
}
